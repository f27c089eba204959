//! The Omni-Forge pipeline: one text completion fanned out into concurrent
//! image and audio generation, assembled into a single outcome.

use std::time::Instant;

use tracing::{info, warn};

use crate::{
    audio::{self, PcmBuffer},
    config::ForgeConfig,
    errors::{ForgeError, Result},
    parser,
    providers::{AspectRatio, MediaAsset, MediaBackend},
    status::StatusLog,
};

const OMNI_DIRECTIVE: &str = "You are the Omni-Forge intelligence core of World AI Force. \
Answer the directive below with exactly three labelled sections, in this order:\n\
[CONTENT] a short narrative response to the directive.\n\
[IMAGE_PROMPT] one vivid visual scene description suitable for an image generator.\n\
[AUDIO_SCRIPT] one or two spoken sentences suitable for narration.\n\
Do not add any other labels or commentary.";

const LOG_PREVIEW_CHARS: usize = 48;

/// Three-part intelligence package handed back to the presenter. The
/// narrative is always present; the media assets fail independently.
#[derive(Debug)]
pub struct OmniForgeOutcome {
    pub narrative: String,
    pub image: Option<MediaAsset>,
    pub audio: Option<MediaAsset>,
    pub elapsed_ms: u128,
}

#[derive(Debug)]
pub struct ImageForgeOutcome {
    pub image: MediaAsset,
    pub elapsed_ms: u128,
}

pub struct ForgeStudio<B: MediaBackend> {
    backend: B,
    style_suffix: String,
    quality_suffix: String,
    log: StatusLog,
}

impl<B: MediaBackend> ForgeStudio<B> {
    pub fn new(backend: B, config: &ForgeConfig) -> Self {
        Self {
            backend,
            style_suffix: config.style_suffix.clone(),
            quality_suffix: config.quality_suffix.clone(),
            log: StatusLog::new(),
        }
    }

    pub fn status_log(&self) -> &StatusLog {
        &self.log
    }

    /// Turns one prompt into narrative + optional image + optional audio.
    ///
    /// The text completion is the only fatal point: without it there is
    /// nothing to drive the media requests. The image and audio sub-requests
    /// run concurrently and settle independently; either may fail without
    /// affecting the other or the overall success.
    pub async fn forge_omni(
        &mut self,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<OmniForgeOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ForgeError::EmptyPrompt);
        }

        let started = Instant::now();
        self.log.push(format!("omni dispatched: {}", preview(prompt)));

        let directive = format!("{OMNI_DIRECTIVE}\n\nDirective: {prompt}");
        let completion = match self.backend.generate_text(&directive).await {
            Ok(text) => text,
            Err(err) => {
                warn!(target: "forge", error = %err, "text completion failed, aborting omni run");
                self.log.push(format!("omni failed: {}", err.advisory()));
                return Err(err);
            }
        };

        let parsed = parser::parse_omni(&completion, prompt);
        info!(
            target: "forge",
            image_prompt = %parsed.image_prompt,
            "completion parsed, dispatching media requests"
        );

        let styled_prompt = format!("{}, {}", parsed.image_prompt, self.style_suffix);
        let (image_result, audio_result) = tokio::join!(
            self.backend.generate_image(&styled_prompt, aspect),
            self.backend.generate_audio(&parsed.audio_script),
        );

        let image = match image_result {
            Ok(asset) => {
                self.log.push("image asset forged");
                Some(asset)
            }
            Err(err) => {
                warn!(target: "forge", error = %err, "image generation failed, continuing without image");
                self.log.push(format!("image lost: {}", err.advisory()));
                None
            }
        };

        let audio = match audio_result {
            Ok(asset) => {
                self.log.push("audio asset forged");
                Some(asset)
            }
            Err(err) => {
                warn!(target: "forge", error = %err, "audio generation failed, continuing without audio");
                self.log.push(format!("audio lost: {}", err.advisory()));
                None
            }
        };

        let elapsed_ms = started.elapsed().as_millis();
        info!(target: "forge", elapsed_ms = elapsed_ms as u64, "omni run complete");
        self.log.push(format!("omni complete in {elapsed_ms}ms"));

        Ok(OmniForgeOutcome {
            narrative: parsed.narrative,
            image,
            audio,
            elapsed_ms,
        })
    }

    /// Single-modality path: the raw prompt, decorated with the fixed quality
    /// suffix, sent straight to the image model. No parsing step.
    pub async fn forge_image(
        &mut self,
        prompt: &str,
        aspect: AspectRatio,
    ) -> Result<ImageForgeOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ForgeError::EmptyPrompt);
        }

        let started = Instant::now();
        self.log.push(format!("image dispatched: {}", preview(prompt)));

        let decorated = format!("{prompt}, {}", self.quality_suffix);
        match self.backend.generate_image(&decorated, aspect).await {
            Ok(image) => {
                let elapsed_ms = started.elapsed().as_millis();
                info!(target: "forge", elapsed_ms = elapsed_ms as u64, "image run complete");
                self.log.push(format!("image complete in {elapsed_ms}ms"));
                Ok(ImageForgeOutcome { image, elapsed_ms })
            }
            Err(err) => {
                warn!(target: "forge", error = %err, "image run failed");
                self.log.push(format!("image failed: {}", err.advisory()));
                Err(err)
            }
        }
    }

    /// Decodes a forged audio asset into a playable waveform, recording the
    /// result in the status log. A decode failure degrades the audio only;
    /// the rest of the outcome stays intact.
    pub fn decode_audio(&mut self, asset: &MediaAsset) -> Result<PcmBuffer> {
        match audio::decode_pcm16(&asset.data) {
            Ok(buffer) => {
                self.log.push(format!("audio decoded: {} samples", buffer.len()));
                Ok(buffer)
            }
            Err(err) => {
                warn!(target: "forge", error = %err, "audio payload undecodable");
                self.log.push(format!("audio undecodable: {}", err.advisory()));
                Err(err)
            }
        }
    }
}

fn preview(prompt: &str) -> String {
    if prompt.chars().count() <= LOG_PREVIEW_CHARS {
        prompt.to_string()
    } else {
        let cut: String = prompt.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{cut}…")
    }
}
