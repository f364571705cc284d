//! # sqlpad-repl
//!
//! A SQL*Plus-style console over an in-memory SQLite database.
//!
//! ## Features
//!
//! - Multi-line statements terminated by `;` or a lone `/`
//! - Ghost-text autocompletion from the live schema (right arrow accepts)
//! - Tab completion menu and syntax highlighting
//! - Fixed-width result tables redrawn with borders
//! - Debounced session saving to a local file or an HTTP endpoint
//! - Vi mode support (detected from EDITOR, .inputrc, or SQLPAD_EDIT_MODE)
//!
//! ## Usage
//!
//! ```bash
//! # Run the console
//! sqlpad
//!
//! # Inside the console:
//! SQL> SELECT last_name
//!   2> FROM employees;
//! SQL> DESC jobs
//! SQL> SET LINESIZE 80
//! ```

pub mod completer;
pub mod config;
pub mod core;
pub mod error;
pub mod highlighter;
pub mod host;
pub mod io;
pub mod logging;
pub mod render;
pub mod repl;

pub use config::{Args, Settings};
pub use error::ReplError;
pub use repl::run;
