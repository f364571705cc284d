//! Host implementations for the REPL.
//!
//! The terminal host drives the console through Reedline. Tests use the
//! in-memory `TestHost` from the `io` module instead.

pub mod terminal;

pub use terminal::TerminalHost;
