use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::ApiError;

/// On-disk store for generated QR images, rooted at the configured
/// data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store, creating the data directory if needed.
    pub async fn open(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating data directory {}", root.display()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write image bytes under the given (service-generated) filename.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), ApiError> {
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            ApiError::Storage(
                anyhow::Error::new(e).context(format!("writing {}", path.display())),
            )
        })?;

        log::debug!("Saved {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Read stored image bytes. Names that could escape the data directory
    /// (path separators, leading dots) are treated as absent.
    pub async fn load(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        if !is_safe_name(name) {
            return Err(ApiError::NotFound(format!("image {}", name)));
        }

        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::NotFound(format!("image {}", name)))
            }
            Err(e) => Err(ApiError::Storage(
                anyhow::Error::new(e).context(format!("reading {}", path.display())),
            )),
        }
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.starts_with('.')
}
