//! Identity providers.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlpad_core::{IdentityProvider, PersistError};
use tracing::info;
use uuid::Uuid;

/// A random identity generated on first use and kept in a file.
///
/// The file holds the identity as a hyphenated UUID. A missing or unreadable
/// file is replaced with a fresh identity.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    path: PathBuf,
}

impl LocalIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn identify(&self) -> Result<String, PersistError> {
        if let Ok(text) = tokio::fs::read_to_string(&self.path).await {
            if let Ok(id) = Uuid::parse_str(text.trim()) {
                return Ok(id.hyphenated().to_string());
            }
        }

        let id = Uuid::new_v4().hyphenated().to_string();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &id).await?;
        info!(path = %self.path.display(), "generated new identity");
        Ok(id)
    }
}

/// A fixed identity, e.g. from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(String);

impl StaticIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn identify(&self) -> Result<String, PersistError> {
        let id = self.0.trim();
        if id.is_empty() {
            return Err(PersistError::Identity("empty session id".to_string()));
        }
        Ok(id.to_string())
    }
}
