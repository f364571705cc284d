//! I/O types for the REPL.
//!
//! These types define the interface between the REPL core and its host environment.

use serde::{Deserialize, Serialize};

/// A submitted line of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputLine {
    pub line: String,
}

/// A signal from the host (Ctrl+C, Ctrl+D).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "lowercase")]
pub enum Signal {
    /// User pressed Ctrl+C (interrupt).
    Interrupt,
    /// User pressed Ctrl+D (end of file).
    Eof,
}

/// A key action that is not a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum HostAction {
    /// Replace the input with the previous history entry.
    RecallPrevious,
    /// Replace the input with the next history entry, or clear it.
    RecallNext,
    /// Save the session now.
    ForceSave,
}

/// Output to be written by the REPL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub text: String,
    #[serde(default)]
    pub style: OutputStyle,
}

impl Output {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: OutputStyle::Normal,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: OutputStyle::Error,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: OutputStyle::Info,
        }
    }

    pub fn banner(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: OutputStyle::Banner,
        }
    }
}

/// Style hint for output rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Engine output: rendered tables and statement summaries.
    #[default]
    Normal,
    /// Error entry, already carrying its `ERROR:` text.
    Error,
    /// Messages from the console itself.
    Info,
    /// Welcome banner.
    Banner,
}

/// Prompt configuration sent from core to host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// `SQL>` when idle, else the number of the line being entered.
    pub prompt: String,
    /// Persistence status, for display beside the input.
    pub status: String,
    /// Replacement for the current input, set after a recall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<String>,
}

/// Reason the REPL exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// User pressed Ctrl+D.
    Eof,
}
