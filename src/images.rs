//! Persistence of captured article images.
//!
//! Every image is written to a new file named with a random UUID, opened with
//! `create_new` so an existing file is never overwritten. Several scrapes may
//! share one directory.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to `<dir>/<uuid>.png`, creating the directory if absent.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Captured image data
    ///
    /// # Returns
    ///
    /// Path of the new file. Fails rather than overwrite an existing file.
    #[instrument(level = "debug", skip_all, fields(dir = %self.dir.display(), bytes = bytes.len()))]
    pub async fn save(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.png", Uuid::new_v4()));
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        debug!(path = %path.display(), "Saved image");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_directory_and_unique_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("imgs"));

        let first = store.save(b"one").await.unwrap();
        let second = store.save(b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with(store.dir()));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_save_fails_when_directory_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("imgs");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = ImageStore::new(&blocker);
        assert!(store.save(b"bytes").await.is_err());
    }
}
