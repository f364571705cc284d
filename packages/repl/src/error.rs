use crate::config::ConfigError;
use crate::io::IoError;

/// Startup and terminal failures that end the program.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("database error: {0}")]
    Engine(#[from] sqlpad_core::EngineError),

    #[error("session store error: {0}")]
    Store(#[from] sqlpad_cloud::Error),

    #[error("cannot start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),
}
