use std::path::PathBuf;

use crate::capabilities::BinaryArtifact;
use tokio::fs;

/// 将生成的产物写入输出目录，同名文件直接覆盖
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn persist(
        &self,
        file_name: &str,
        artifact: &BinaryArtifact,
    ) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let file_path = self.root.join(file_name);
        fs::write(&file_path, &artifact.data).await?;

        tracing::debug!(
            path = %file_path.display(),
            media_type = %artifact.media_type,
            bytes = artifact.data.len(),
            "产物已写入"
        );

        Ok(file_path)
    }
}
