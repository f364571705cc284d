//! Platform-independent REPL core.
//!
//! This module contains the main REPL logic, which interacts only through
//! the `IoHost` trait. The core owns the [`Session`] and the tokio runtime
//! its persistence runs on; hosts never touch either.

use std::path::PathBuf;

use sqlpad_core::{EntryKind, Session, SharedSchema, TranscriptUpdate};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::io::{ExitReason, HostAction, IoError, IoHost, Output, PromptConfig, Signal};

/// The platform-independent REPL core.
pub struct ReplCore {
    session: Session,
    runtime: Runtime,
    import: Option<PathBuf>,
    export: Option<PathBuf>,
    prefill: Option<String>,
}

impl ReplCore {
    pub fn new(session: Session, runtime: Runtime) -> Self {
        Self {
            session,
            runtime,
            import: None,
            export: None,
            prefill: None,
        }
    }

    /// Import this file once the session is up.
    pub fn with_import(mut self, path: Option<PathBuf>) -> Self {
        self.import = path;
        self
    }

    /// Export the database to this file when the session ends.
    pub fn with_export(mut self, path: Option<PathBuf>) -> Self {
        self.export = path;
        self
    }

    /// Schema handle for completion front ends.
    pub fn schema(&self) -> SharedSchema {
        self.session.schema()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the REPL loop, reading/writing through the provided I/O host.
    pub fn run(&mut self, io: &mut impl IoHost) -> Result<ExitReason, IoError> {
        let update = self.runtime.block_on(self.session.initialize());
        self.write_update(io, update)?;
        if let Some(path) = self.import.take() {
            let update = self.session.import_file(&path);
            self.write_update(io, update)?;
        }
        io.flush()?;

        loop {
            self.update_prompt(io)?;
            io.wait_for_input()?;

            if let Some(signal) = io.read_signal()? {
                match signal {
                    Signal::Eof => {
                        self.finish(io)?;
                        return Ok(ExitReason::Eof);
                    }
                    Signal::Interrupt => {
                        io.write_output(Output::info("^C (use Ctrl-D to save and quit)"))?;
                        continue;
                    }
                }
            }

            if let Some(action) = io.read_action()? {
                self.handle_action(io, action)?;
                io.flush()?;
                continue;
            }

            let input = match io.read_input()? {
                Some(input) => input,
                None => continue,
            };

            let update = self.session.submit(&input.line);
            self.write_update(io, update)?;
            io.flush()?;
        }
    }

    fn handle_action(&mut self, io: &mut impl IoHost, action: HostAction) -> Result<(), IoError> {
        debug!(?action, "host action");
        match action {
            HostAction::RecallPrevious => {
                if let Some(line) = self.session.recall_previous() {
                    self.prefill = Some(line.to_string());
                }
            }
            HostAction::RecallNext => {
                self.prefill = Some(self.session.recall_next().to_string());
            }
            HostAction::ForceSave => {
                let update = self.runtime.block_on(self.session.force_save());
                self.write_update(io, update)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, io: &mut impl IoHost) -> Result<(), IoError> {
        if let Some(path) = self.export.take() {
            let update = self.session.export_file(&path);
            self.write_update(io, update)?;
        }
        self.runtime.block_on(self.session.shutdown());
        io.write_output(Output::info("Goodbye!"))?;
        io.flush()
    }

    /// Show transcript entries. Command entries are already on screen as
    /// typed input and are not repeated.
    fn write_update(&self, io: &mut impl IoHost, update: TranscriptUpdate) -> Result<(), IoError> {
        if update.cleared {
            io.clear()?;
        }
        for entry in update.entries {
            let output = match entry.kind {
                EntryKind::Welcome => Output::banner(entry.text),
                EntryKind::Command => continue,
                EntryKind::Output => Output::normal(entry.text),
                EntryKind::Error => Output::error(entry.text),
            };
            io.write_output(output)?;
        }
        Ok(())
    }

    fn update_prompt(&mut self, io: &mut impl IoHost) -> Result<(), IoError> {
        let status = self.session.status().borrow().to_string();
        io.write_prompt(PromptConfig {
            prompt: self.session.prompt(),
            status,
            prefill: self.prefill.take(),
        })
    }
}
