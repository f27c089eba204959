mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::errors::Result;

/// Inline binary payload returned by a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl MediaAsset {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            mime if mime.starts_with("audio/") => "pcm",
            _ => "bin",
        }
    }
}

/// Aspect ratios accepted by the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Square,
    Widescreen,
    Tall,
    Standard,
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "1:1" | "square" => Some(AspectRatio::Square),
            "16:9" | "widescreen" => Some(AspectRatio::Widescreen),
            "9:16" | "tall" => Some(AspectRatio::Tall),
            "4:3" | "standard" => Some(AspectRatio::Standard),
            "3:4" | "portrait" => Some(AspectRatio::Portrait),
            _ => None,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Seam between the orchestrator and the external generation service. One
/// method per modality; each call is a single round trip with no retry.
#[async_trait]
pub trait MediaBackend {
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    async fn generate_image(&self, prompt: &str, aspect: AspectRatio) -> Result<MediaAsset>;

    async fn generate_audio(&self, script: &str) -> Result<MediaAsset>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_parses_both_spellings() {
        assert_eq!(AspectRatio::parse("16:9"), Some(AspectRatio::Widescreen));
        assert_eq!(AspectRatio::parse("Portrait"), Some(AspectRatio::Portrait));
        assert_eq!(AspectRatio::parse("2:1"), None);
    }

    #[test]
    fn media_asset_extension_follows_mime() {
        assert_eq!(MediaAsset::new(vec![], "image/png").file_extension(), "png");
        assert_eq!(
            MediaAsset::new(vec![], "audio/L16;codec=pcm;rate=24000").file_extension(),
            "pcm"
        );
        assert_eq!(
            MediaAsset::new(vec![], "application/octet-stream").file_extension(),
            "bin"
        );
    }
}
