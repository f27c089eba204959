use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GeminiConfig,
    errors::{ForgeError, Result},
    providers::{AspectRatio, MediaAsset, MediaBackend},
};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Adapter for the Gemini `generateContent` endpoint. One struct covers all
/// three modalities; the model identifier and generation config vary per call.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
    audio_model: String,
    voice: String,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent("omniforge/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForgeError::service(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            audio_model: config.audio_model.clone(),
            voice: config.voice.clone(),
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation_config: Option<GenerationConfig<'_>>,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        };

        debug!(target: "gemini", %model, "dispatching generateContent request");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ForgeError::service(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::RateLimited(snippet(&body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::service(format!(
                "Gemini API request failed ({status}): {}",
                snippet(&body)
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::service(format!("failed to parse response: {e}")))?;

        Ok(parsed)
    }
}

#[async_trait]
impl MediaBackend for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let response = self.generate(&self.text_model, prompt, None).await?;
        response.extract_text().ok_or(ForgeError::EmptyCompletion)
    }

    async fn generate_image(&self, prompt: &str, aspect: AspectRatio) -> Result<MediaAsset> {
        let config = GenerationConfig {
            response_modalities: Some(vec!["IMAGE"]),
            image_config: Some(ImageConfig {
                aspect_ratio: aspect.as_str(),
            }),
            speech_config: None,
        };

        let response = self
            .generate(&self.image_model, prompt, Some(config))
            .await?;
        response.extract_inline()?.ok_or(ForgeError::EmptyCompletion)
    }

    async fn generate_audio(&self, script: &str) -> Result<MediaAsset> {
        let config = GenerationConfig {
            response_modalities: Some(vec!["AUDIO"]),
            image_config: None,
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: &self.voice },
                },
            }),
        };

        let response = self
            .generate(&self.audio_model, script, Some(config))
            .await?;
        response.extract_inline()?.ok_or(ForgeError::EmptyCompletion)
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 240;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Untagged union of text and inline media parts. Variant order matters for
/// `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload carried inside a candidate part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn extract_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let parts = &candidate.content.as_ref()?.parts;

        let text: Vec<&str> = parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text.join("\n"))
        }
    }

    fn extract_inline(&self) -> Result<Option<MediaAsset>> {
        let inline = self.candidates.first().and_then(|candidate| {
            candidate.content.as_ref()?.parts.iter().find_map(|part| match part {
                Part::InlineData { inline_data } => Some(inline_data),
                Part::Text { .. } => None,
            })
        });

        let Some(inline) = inline else {
            return Ok(None);
        };

        let data = BASE64_STANDARD
            .decode(inline.data.trim())
            .map_err(|e| ForgeError::service(format!("invalid inline payload: {e}")))?;

        Ok(Some(MediaAsset::new(data, inline.mime_type.clone())))
    }
}
