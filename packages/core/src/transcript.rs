//! The append-only record of what the session showed.

use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "SQL*Plus-style console (sqlpad)\n\
Your database is saved automatically.\n\
Type 'help' or 'clear'. End SQL with a semicolon (;) or '/' to execute.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Welcome,
    Command,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
    /// Prompt shown in front of a command entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl TranscriptEntry {
    pub fn welcome() -> Self {
        Self::new(EntryKind::Welcome, WELCOME)
    }

    pub fn command(prompt: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Command,
            text: text.into(),
            prompt: Some(prompt.into()),
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Output, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            prompt: None,
        }
    }
}

/// Entries in display order. Entries are never edited once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// A transcript holding only the welcome banner.
    pub fn new() -> Self {
        Self {
            entries: vec![TranscriptEntry::welcome()],
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace everything with the welcome banner followed by `message`.
    pub fn restart_with(&mut self, message: impl Into<String>) {
        self.entries = vec![TranscriptEntry::welcome(), TranscriptEntry::output(message)];
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Entries pushed at or after index `from`.
    ///
    /// If the transcript was cleared since `from` was taken, this is every
    /// entry currently present.
    pub fn since(&self, from: usize) -> &[TranscriptEntry] {
        if from > self.entries.len() {
            &self.entries
        } else {
            &self.entries[from..]
        }
    }
}
