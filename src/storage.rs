//! Local file store for uploaded documents.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Writes `data` under a fresh name and returns that name as the
    /// stored-file reference.
    pub async fn store(&self, original_name: &str, data: &[u8]) -> std::io::Result<String> {
        let reference = format!(
            "{}_{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            extension_of(original_name)
        );
        tokio::fs::write(self.root.join(&reference), data).await?;
        tracing::debug!(reference = %reference, original_name, bytes = data.len(), "Stored upload");
        Ok(reference)
    }

    /// Best-effort removal of a stored file whose submission was rejected.
    pub async fn discard(&self, reference: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(reference)).await {
            tracing::warn!(reference, "Failed to discard stored upload: {}", e);
        }
    }
}

fn extension_of(original_name: &str) -> &str {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 16 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("paper.pdf"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "bin");
        assert_eq!(extension_of("weird.p d f"), "bin");
    }

    #[tokio::test]
    async fn test_store_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let first = store.store("paper.pdf", b"%PDF-1.4").await.unwrap();
        let second = store.store("paper.pdf", b"%PDF-1.4").await.unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with(".pdf"));
        assert_eq!(tokio::fs::read(dir.path().join(&first)).await.unwrap(), b"%PDF-1.4");

        store.discard(&first).await;
        assert!(!dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());
    }
}
