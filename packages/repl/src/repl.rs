//! Wiring for the terminal console.

use std::sync::Arc;

use sqlpad_cloud::{FileSessionStore, HttpSessionStore, LocalIdentity, StaticIdentity};
use sqlpad_core::{IdentityProvider, Session, SessionStore};
use sqlpad_sqlite::SqliteEngine;
use tracing::info;
use uuid::Uuid;

use crate::config::{Settings, StoreChoice};
use crate::core::ReplCore;
use crate::error::ReplError;
use crate::host::TerminalHost;
use crate::io::ExitReason;

/// Run the interactive console until the user ends it.
pub fn run(settings: Settings) -> Result<ExitReason, ReplError> {
    // Multi-threaded so pending saves progress while the editor blocks.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ReplError::Runtime)?;

    let engine = SqliteEngine::open_in_memory()?;
    let mut session = Session::new(Box::new(engine)).with_line_width(settings.line_width);
    if let Some(store) = build_store(&settings.store)? {
        session = session.with_store(store, settings.save_delay);
    }

    let mut core = ReplCore::new(session, runtime)
        .with_import(settings.import)
        .with_export(settings.export);
    let mut host = TerminalHost::new(core.schema(), settings.edit_mode, settings.history_path)
        .map_err(ReplError::Terminal)?;

    Ok(core.run(&mut host)?)
}

/// The session store for `choice`, if any.
pub fn build_store(choice: &StoreChoice) -> Result<Option<Arc<dyn SessionStore>>, ReplError> {
    let store: Arc<dyn SessionStore> = match choice {
        StoreChoice::None => return Ok(None),
        StoreChoice::File(path) => {
            info!(path = %path.display(), "saving session to file");
            Arc::new(FileSessionStore::new(path))
        }
        StoreChoice::Remote {
            url,
            session_id,
            identity_file,
        } => {
            let identity: Arc<dyn IdentityProvider> = match (session_id, identity_file) {
                (Some(id), _) => Arc::new(StaticIdentity::new(id.clone())),
                (None, Some(path)) => Arc::new(LocalIdentity::new(path)),
                (None, None) => Arc::new(StaticIdentity::new(Uuid::new_v4().to_string())),
            };
            info!(%url, "saving session remotely");
            Arc::new(HttpSessionStore::new(url, identity)?)
        }
    };
    Ok(Some(store))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn no_store_when_saving_is_off() {
        assert!(build_store(&StoreChoice::None).unwrap().is_none());
    }

    #[test]
    fn file_and_remote_stores_build() {
        let file = StoreChoice::File(PathBuf::from("/tmp/sqlpad-test/session.db"));
        assert!(build_store(&file).unwrap().is_some());

        let remote = StoreChoice::Remote {
            url: "https://example.com/api".to_string(),
            session_id: Some("abc".to_string()),
            identity_file: None,
        };
        assert!(build_store(&remote).unwrap().is_some());
    }

    #[test]
    fn bad_remote_url_is_an_error() {
        let remote = StoreChoice::Remote {
            url: "not a url".to_string(),
            session_id: Some("abc".to_string()),
            identity_file: None,
        };
        assert!(matches!(build_store(&remote), Err(ReplError::Store(_))));
    }
}
