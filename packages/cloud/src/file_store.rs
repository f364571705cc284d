//! A [`SessionStore`] that keeps the raw image in a local file.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlpad_core::{PersistError, SessionStore};
use tracing::debug;

/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash never leaves a half-written image behind.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("session"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    /// Create the parent directory; the identity is the file path.
    async fn init(&self) -> Result<String, PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(self.path.display().to_string())
    }

    async fn save(&self, image: &[u8]) -> Result<(), PersistError> {
        let temp = self.temp_path();
        tokio::fs::write(&temp, image).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = image.len(), "session file written");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match tokio::fs::read(&self.path).await {
            Ok(image) => Ok(Some(image)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
