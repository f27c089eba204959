use std::env;

use serde_json::{Map, json};
use tracing::{info, warn};

use omniforge::{
    AspectRatio, ForgeConfig, ForgeError, GeminiClient, ForgeStudio, Result,
    util::ArtifactWriter,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = CliArgs::parse(env::args().skip(1))?;
    let config = ForgeConfig::load()?;

    let gemini = config
        .gemini
        .as_ref()
        .ok_or(ForgeError::MissingConfig("gemini.api_key"))?;
    let client = GeminiClient::from_config(gemini)?;
    let mut studio = ForgeStudio::new(client, &config);
    let writer = ArtifactWriter::new(config.artifacts_dir.clone()).await?;

    let run = if cli.image_only {
        run_image(&mut studio, &writer, &cli).await
    } else {
        run_omni(&mut studio, &writer, &cli).await
    };

    if let Err(err) = &run {
        eprintln!("{}", err.advisory());
    }

    if !studio.status_log().is_empty() {
        println!("\n-- status log --");
        for line in studio.status_log().entries() {
            println!("  {line}");
        }
    }

    run
}

async fn run_omni(
    studio: &mut ForgeStudio<GeminiClient>,
    writer: &ArtifactWriter,
    cli: &CliArgs,
) -> Result<()> {
    let outcome = studio.forge_omni(&cli.prompt, cli.aspect).await?;

    println!("{}", outcome.narrative);

    if let Some(image) = &outcome.image {
        let mut meta = Map::new();
        meta.insert("prompt".to_string(), json!(cli.prompt));
        meta.insert("mime_type".to_string(), json!(image.mime_type));
        meta.insert("aspect_ratio".to_string(), json!(cli.aspect.as_str()));
        let path = writer
            .persist("image", &image.data, image.file_extension(), meta)
            .await?;
        info!(target: "presenter", path = %path.display(), "image asset persisted");
    }

    if let Some(asset) = &outcome.audio {
        // Decode on demand; a malformed payload degrades to "audio
        // unavailable" without discarding the rest of the outcome.
        match studio.decode_audio(asset) {
            Ok(buffer) => {
                let mut meta = Map::new();
                meta.insert("prompt".to_string(), json!(cli.prompt));
                meta.insert("mime_type".to_string(), json!(asset.mime_type));
                meta.insert("sample_rate".to_string(), json!(buffer.sample_rate));
                meta.insert("duration_secs".to_string(), json!(buffer.duration_secs()));
                let path = writer
                    .persist("audio", &buffer.to_wav_bytes(), "wav", meta)
                    .await?;
                info!(target: "presenter", path = %path.display(), "audio asset persisted");
            }
            Err(err) => {
                warn!(target: "presenter", error = %err, "audio asset undecodable, skipping");
                eprintln!("{}", err.advisory());
            }
        }
    }

    info!(target: "presenter", elapsed_ms = outcome.elapsed_ms as u64, "forge run finished");
    Ok(())
}

async fn run_image(
    studio: &mut ForgeStudio<GeminiClient>,
    writer: &ArtifactWriter,
    cli: &CliArgs,
) -> Result<()> {
    let outcome = studio.forge_image(&cli.prompt, cli.aspect).await?;

    let mut meta = Map::new();
    meta.insert("prompt".to_string(), json!(cli.prompt));
    meta.insert("mime_type".to_string(), json!(outcome.image.mime_type));
    meta.insert("aspect_ratio".to_string(), json!(cli.aspect.as_str()));
    let path = writer
        .persist(
            "image",
            &outcome.image.data,
            outcome.image.file_extension(),
            meta,
        )
        .await?;

    println!("image saved to {}", path.display());
    info!(target: "presenter", elapsed_ms = outcome.elapsed_ms as u64, "image run finished");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Debug)]
struct CliArgs {
    prompt: String,
    aspect: AspectRatio,
    image_only: bool,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut prompt_words = Vec::new();
        let mut aspect = AspectRatio::default();
        let mut image_only = false;

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--image-only" => image_only = true,
                "--aspect" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ForgeError::other("--aspect requires a value"))?;
                    aspect = AspectRatio::parse(&value).ok_or_else(|| {
                        ForgeError::other(format!(
                            "unknown aspect ratio {value:?} (expected 1:1, 16:9, 9:16, 4:3 or 3:4)"
                        ))
                    })?;
                }
                _ => prompt_words.push(arg),
            }
        }

        let prompt = prompt_words.join(" ");
        if prompt.trim().is_empty() {
            eprintln!("usage: omniforge [--image-only] [--aspect RATIO] <prompt>");
            return Err(ForgeError::EmptyPrompt);
        }

        Ok(Self {
            prompt,
            aspect,
            image_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_and_flags() {
        let cli = CliArgs::parse(
            ["--aspect", "16:9", "a", "lantern", "in", "the", "fog"]
                .into_iter()
                .map(String::from),
        )
        .expect("args should parse");

        assert_eq!(cli.prompt, "a lantern in the fog");
        assert_eq!(cli.aspect, AspectRatio::Widescreen);
        assert!(!cli.image_only);
    }

    #[test]
    fn rejects_missing_prompt() {
        let err = CliArgs::parse(["--image-only"].into_iter().map(String::from))
            .expect_err("missing prompt must be rejected");
        assert!(matches!(err, ForgeError::EmptyPrompt));
    }

    #[test]
    fn rejects_unknown_aspect() {
        let err = CliArgs::parse(
            ["--aspect", "2:1", "prompt"].into_iter().map(String::from),
        )
        .expect_err("unknown aspect must be rejected");
        assert!(matches!(err, ForgeError::Other(_)));
    }
}
