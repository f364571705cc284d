//! I/O abstraction for the REPL.
//!
//! This module defines the interface between the REPL core and its host environment.
//! The core interacts only through the `IoHost` trait, so the terminal host and
//! the in-memory test host drive the same loop.

pub mod types;

#[cfg(test)]
pub mod test_host;

pub use types::*;

#[cfg(test)]
pub use test_host::TestHost;

/// Error type for I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(String),
}

/// Host interface for REPL I/O operations.
///
/// After `wait_for_input()` returns, at most one of `read_signal()`,
/// `read_action()` and `read_input()` yields something; the core checks them
/// in that order.
pub trait IoHost {
    /// Wait for input to become available.
    fn wait_for_input(&mut self) -> Result<(), IoError>;

    /// Read the next submitted line, if available.
    fn read_input(&mut self) -> Result<Option<InputLine>, IoError>;

    /// Read any pending signal (Ctrl+C, Ctrl+D).
    fn read_signal(&mut self) -> Result<Option<Signal>, IoError>;

    /// Read any pending key action. Hosts without such keys keep the default.
    fn read_action(&mut self) -> Result<Option<HostAction>, IoError> {
        Ok(None)
    }

    /// Write output to the user.
    fn write_output(&mut self, output: Output) -> Result<(), IoError>;

    /// Update the prompt configuration used for the next input.
    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError>;

    /// Wipe everything shown so far.
    fn clear(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), IoError> {
        Ok(())
    }
}
