//! Session persistence: the store seam and the debounced saver.
//!
//! A [`SessionStore`] keeps one opaque database image per identity. The
//! session never awaits a store on its hot path; modifying statements hand a
//! fresh image to the [`AutoSaver`], whose worker task waits for input to go
//! quiet before writing. Only the most recent image is ever written.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::PersistError;

/// Default quiet period before a scheduled save is written.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Durable storage for a session's database image.
///
/// `init` must succeed before `save` or `load` are used.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Establish the identity the image is stored under and return it.
    async fn init(&self) -> Result<String, PersistError>;

    /// Replace the stored image.
    async fn save(&self, image: &[u8]) -> Result<(), PersistError>;

    /// The stored image, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<Vec<u8>>, PersistError>;
}

/// Supplies the identity a store keys its document by.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn identify(&self) -> Result<String, PersistError>;
}

/// Persistence state, for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No store; nothing leaves this process.
    #[default]
    Local,
    /// A save is scheduled and waiting for input to go quiet.
    Pending,
    Saving,
    Saved,
    /// The session was restored from the store.
    Loaded,
    Failed(String),
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Local => write!(f, "local session"),
            SyncStatus::Pending => write!(f, "unsaved changes"),
            SyncStatus::Saving => write!(f, "saving..."),
            SyncStatus::Saved => write!(f, "all changes saved"),
            SyncStatus::Loaded => write!(f, "session restored"),
            SyncStatus::Failed(reason) => write!(f, "save failed: {}", reason),
        }
    }
}

/// Shared publisher of [`SyncStatus`].
pub type StatusSender = Arc<watch::Sender<SyncStatus>>;

enum Request {
    Schedule(Vec<u8>),
    Flush(Vec<u8>, oneshot::Sender<Result<(), PersistError>>),
    Shutdown(oneshot::Sender<()>),
}

/// Debounced, last-write-wins writer in front of a [`SessionStore`].
pub struct AutoSaver {
    requests: mpsc::UnboundedSender<Request>,
    worker: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn SessionStore>, delay: Duration, status: StatusSender) -> Self {
        let (requests, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, delay, rx, status));
        Self { requests, worker }
    }

    /// Schedule `image` to be saved once no newer image arrives within the
    /// delay. Replaces any image still waiting.
    pub fn schedule(&self, image: Vec<u8>) {
        if self.requests.send(Request::Schedule(image)).is_err() {
            warn!("auto-save worker is gone; dropping scheduled save");
        }
    }

    /// Save `image` now, cancelling any scheduled save.
    pub async fn flush(&self, image: Vec<u8>) -> Result<(), PersistError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Flush(image, reply))
            .map_err(|_| PersistError::Unavailable("auto-save worker stopped".to_string()))?;
        rx.await
            .map_err(|_| PersistError::Unavailable("auto-save worker stopped".to_string()))?
    }

    /// Write any scheduled image and stop the worker.
    pub async fn shutdown(self) {
        let (reply, rx) = oneshot::channel();
        if self.requests.send(Request::Shutdown(reply)).is_ok() {
            let _ = rx.await;
        }
        if let Err(e) = self.worker.await {
            warn!(error = %e, "auto-save worker panicked");
        }
    }
}

async fn run_worker(
    store: Arc<dyn SessionStore>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Request>,
    status: StatusSender,
) {
    let mut pending: Option<Vec<u8>> = None;

    loop {
        let request = if pending.is_some() {
            tokio::select! {
                request = rx.recv() => request,
                _ = tokio::time::sleep(delay) => {
                    if let Some(image) = pending.take() {
                        let _ = save(store.as_ref(), &image, &status).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match request {
            Some(Request::Schedule(image)) => {
                debug!(bytes = image.len(), "save scheduled");
                pending = Some(image);
                status.send_replace(SyncStatus::Pending);
            }
            Some(Request::Flush(image, reply)) => {
                pending = None;
                let result = save(store.as_ref(), &image, &status).await;
                let _ = reply.send(result);
            }
            Some(Request::Shutdown(reply)) => {
                if let Some(image) = pending.take() {
                    let _ = save(store.as_ref(), &image, &status).await;
                }
                let _ = reply.send(());
                break;
            }
            None => {
                if let Some(image) = pending.take() {
                    let _ = save(store.as_ref(), &image, &status).await;
                }
                break;
            }
        }
    }
}

async fn save(
    store: &dyn SessionStore,
    image: &[u8],
    status: &watch::Sender<SyncStatus>,
) -> Result<(), PersistError> {
    status.send_replace(SyncStatus::Saving);
    match store.save(image).await {
        Ok(()) => {
            info!(bytes = image.len(), "session saved");
            status.send_replace(SyncStatus::Saved);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "session save failed");
            status.send_replace(SyncStatus::Failed(e.to_string()));
            Err(e)
        }
    }
}

/// A [`SessionStore`] held in memory.
///
/// Useful as a stand-in for a remote store; failures can be switched on to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    image: Mutex<Option<Vec<u8>>>,
    saves: AtomicUsize,
    fail_init: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `image`.
    pub fn with_image(image: Vec<u8>) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.image.lock() {
            *slot = Some(image);
        }
        store
    }

    pub fn image(&self) -> Option<Vec<u8>> {
        self.image.lock().ok().and_then(|slot| slot.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn init(&self) -> Result<String, PersistError> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(PersistError::Identity("sign-in refused".to_string()));
        }
        Ok("memory".to_string())
    }

    async fn save(&self, image: &[u8]) -> Result<(), PersistError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("saves disabled".to_string()));
        }
        let mut slot = self
            .image
            .lock()
            .map_err(|e| PersistError::Unavailable(e.to_string()))?;
        *slot = Some(image.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        let slot = self
            .image
            .lock()
            .map_err(|e| PersistError::Unavailable(e.to_string()))?;
        Ok(slot.clone())
    }
}
