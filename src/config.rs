use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/forge.toml";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_AUDIO_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Charon";
const DEFAULT_STYLE_SUFFIX: &str =
    "cinematic lighting, hyper-detailed, obsidian and gold palette, epic scale";
const DEFAULT_QUALITY_SUFFIX: &str = "ultra high detail, sharp focus, professional render";

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub audio_model: String,
    pub voice: String,
}

#[derive(Clone, Debug)]
pub struct ForgeConfig {
    pub gemini: Option<GeminiConfig>,
    pub style_suffix: String,
    pub quality_suffix: String,
    pub artifacts_dir: PathBuf,
}

impl ForgeConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            env::var("FORGE_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config_path = Path::new(&config_path);

        // The config file is optional: a GEMINI_API_KEY in the environment is
        // enough to bring the forge online with defaults.
        let file_config: FileConfig = if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config file {config_path:?}"))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {config_path:?}"))?
        } else {
            FileConfig::default()
        };

        let artifacts_dir = if let Some(dir) = &file_config.artifacts_dir {
            PathBuf::from(dir)
        } else if let Ok(dir) = env::var("ARTIFACTS_DIR") {
            PathBuf::from(dir)
        } else {
            env::current_dir()?.join("artifacts")
        };

        let gemini = file_config.gemini.unwrap_or_default().into_domain();

        Ok(Self {
            gemini,
            style_suffix: file_config
                .style_suffix
                .unwrap_or_else(|| DEFAULT_STYLE_SUFFIX.to_string()),
            quality_suffix: file_config
                .quality_suffix
                .unwrap_or_else(|| DEFAULT_QUALITY_SUFFIX.to_string()),
            artifacts_dir,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    artifacts_dir: Option<String>,
    #[serde(default)]
    style_suffix: Option<String>,
    #[serde(default)]
    quality_suffix: Option<String>,
    #[serde(default)]
    gemini: Option<FileGeminiConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileGeminiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    text_model: Option<String>,
    #[serde(default)]
    image_model: Option<String>,
    #[serde(default)]
    audio_model: Option<String>,
    #[serde(default)]
    voice: Option<String>,
}

impl FileGeminiConfig {
    fn into_domain(self) -> Option<GeminiConfig> {
        let api_key = self
            .api_key
            .or_else(|| env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())?;

        Some(GeminiConfig {
            api_key,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            audio_model: self
                .audio_model
                .unwrap_or_else(|| DEFAULT_AUDIO_MODEL.to_string()),
            voice: self.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        })
    }
}
