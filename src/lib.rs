//! Omni-Forge: the generation pipeline behind the World AI Force site.
//!
//! One user prompt becomes a three-part intelligence package: a narrative
//! text, an image, and a narrated audio clip. The text completion drives the
//! two media requests, which run concurrently and fail independently.

pub mod audio;
pub mod config;
pub mod errors;
pub mod forge;
pub mod parser;
pub mod providers;
pub mod status;
pub mod util;

pub use audio::{PcmBuffer, decode_pcm16, decode_pcm16_base64};
pub use config::{ForgeConfig, GeminiConfig};
pub use errors::{ForgeError, Result};
pub use forge::{ForgeStudio, ImageForgeOutcome, OmniForgeOutcome};
pub use parser::{ParsedOmniResponse, parse_omni};
pub use providers::{AspectRatio, GeminiClient, MediaAsset, MediaBackend};
pub use status::StatusLog;
