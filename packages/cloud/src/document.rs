//! The JSON document a remote store keeps per identity.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `{"dbState": "<base64 image>", "lastSaved": <unix seconds>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub db_state: String,
    #[serde(default)]
    pub last_saved: u64,
}

impl SessionDocument {
    /// Wrap `image`, stamped with the current time.
    pub fn new(image: &[u8]) -> Self {
        let last_saved = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            db_state: STANDARD.encode(image),
            last_saved,
        }
    }

    pub fn image(&self) -> Result<Vec<u8>, Error> {
        Ok(STANDARD.decode(&self.db_state)?)
    }
}
