use std::path::PathBuf;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tokio::fs;
use uuid::Uuid;

use crate::errors::Result;

/// Persists forged assets under the configured artifacts directory, one data
/// file plus a `.meta.json` sidecar per asset.
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub async fn persist(
        &self,
        label: &str,
        data: &[u8],
        extension: &str,
        mut meta: Map<String, Value>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;

        let now = Utc::now();
        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let id = Uuid::new_v4();
        let base_name = format!("{label}_{timestamp}_{}", &id.to_string()[..8]);

        let file_name = format!("{base_name}.{extension}");
        let file_path = self.root.join(&file_name);
        fs::write(&file_path, data).await?;

        meta.insert("label".to_string(), json!(label));
        meta.insert("artifact".to_string(), json!(file_name));
        meta.insert("created_at".to_string(), json!(now.to_rfc3339()));

        let meta_path = self.root.join(format!("{base_name}.meta.json"));
        fs::write(&meta_path, serde_json::to_vec_pretty(&Value::Object(meta))?).await?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persists_data_file_and_meta_sidecar() {
        let root = std::env::temp_dir().join(format!("omniforge-test-{}", Uuid::new_v4()));
        let writer = ArtifactWriter::new(root.clone())
            .await
            .expect("writer should create root");

        let mut meta = Map::new();
        meta.insert("prompt".to_string(), json!("a lantern"));

        let path = writer
            .persist("image", &[1, 2, 3], "png", meta)
            .await
            .expect("persist should succeed");

        let written = fs::read(&path).await.expect("data file exists");
        assert_eq!(written, vec![1, 2, 3]);

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .expect("stem")
            .to_string();
        let meta_path = path.with_file_name(format!("{stem}.meta.json"));
        let sidecar = fs::read(&meta_path).await.expect("sidecar exists");
        let value: Value = serde_json::from_slice(&sidecar).expect("sidecar is json");
        assert_eq!(value["prompt"], "a lantern");
        assert_eq!(value["label"], "image");
        assert!(value["created_at"].is_string());

        fs::remove_dir_all(&root).await.expect("cleanup");
    }
}
