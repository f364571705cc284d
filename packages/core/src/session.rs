//! The session: one engine, one transcript, one line buffer.
//!
//! Every mutation of session state goes through [`Session`]. Front ends feed
//! it submitted lines and key actions and render the transcript entries each
//! call returns.

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::assembler::{Action, MetaCommand, StatementAssembler};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::format::{render_result, render_table, summary};
use crate::history::CommandHistory;
use crate::keywords::{MODIFYING, STRUCTURAL};
use crate::persist::{AutoSaver, SessionStore, StatusSender, SyncStatus, DEFAULT_SAVE_DELAY};
use crate::schema::{Schema, SchemaCache, SharedSchema};
use crate::transcript::{Transcript, TranscriptEntry};

pub const DEFAULT_LINE_WIDTH: usize = 1000;

pub const HELP: &str = "\
Commands:
  /                      - Executes the command in the buffer.
  DESC <table_name>      - Shows the structure of a table.
  SET LINESIZE <number>  - Sets the width for displaying output.
  CLEAR                  - Clears the terminal screen.
  HELP                   - Shows this help message.

Keys:
  Right arrow            - Accepts the suggested completion.
  Tab                    - Lists completions.
  Up / Down              - Recalls previous commands.
  Ctrl-S                 - Saves the session now.
  Ctrl-D                 - Saves and exits.";

/// Tables created for a brand-new session.
pub const DEFAULT_SCHEMA_SQL: &str = "\
CREATE TABLE employees (
    employee_id INT PRIMARY KEY, first_name VARCHAR(20), last_name VARCHAR(25),
    email VARCHAR(25), hire_date DATE, job_id VARCHAR(10), salary DECIMAL(8, 2)
);
INSERT INTO employees VALUES
(100, 'Steven', 'King', 'SKING', '2003-06-17', 'AD_PRES', 24000.00),
(101, 'Neena', 'Kochhar', 'NKOCHHAR', '2005-09-21', 'AD_VP', 17000.00);
CREATE TABLE jobs (job_id VARCHAR(10) PRIMARY KEY, job_title VARCHAR(35));
INSERT INTO jobs VALUES ('AD_PRES', 'President'), ('AD_VP', 'Administration VP');";

const CREATED_DEFAULTS: &str = "Created default tables (employees, jobs).";
const RESTORED: &str = "Session restored from the cloud.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Rendered rows wider than this are cut onto a second line.
    pub line_width: usize,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

/// Transcript entries produced by one session call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptUpdate {
    /// The transcript was wiped or restarted; earlier entries are gone.
    pub cleared: bool,
    pub entries: Vec<TranscriptEntry>,
}

struct Persistence {
    store: Arc<dyn SessionStore>,
    delay: Duration,
    saver: Option<AutoSaver>,
}

pub struct Session {
    engine: Box<dyn Engine>,
    assembler: StatementAssembler,
    transcript: Transcript,
    history: CommandHistory,
    settings: ExecutionSettings,
    schema_cache: SchemaCache,
    schema: SharedSchema,
    persistence: Option<Persistence>,
    status: StatusSender,
}

impl Session {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            assembler: StatementAssembler::new(),
            transcript: Transcript::new(),
            history: CommandHistory::new(),
            settings: ExecutionSettings::default(),
            schema_cache: SchemaCache::new(),
            schema: Arc::new(RwLock::new(Schema::default())),
            persistence: None,
            status: Arc::new(watch::channel(SyncStatus::Local).0),
        }
    }

    /// Persist through `store`, writing at most once per `delay` of quiet.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>, delay: Duration) -> Self {
        self.persistence = Some(Persistence {
            store,
            delay,
            saver: None,
        });
        self
    }

    /// [`with_store`](Self::with_store) with the default delay.
    pub fn with_default_store(self, store: Arc<dyn SessionStore>) -> Self {
        self.with_store(store, DEFAULT_SAVE_DELAY)
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        if line_width > 0 {
            self.settings.line_width = line_width;
        }
        self
    }

    /// Bring the session up: restore the stored image, or seed the default
    /// tables and save them. Must run inside a tokio runtime when a store is
    /// configured.
    ///
    /// A store that cannot be initialized is dropped and the session
    /// continues locally.
    pub async fn initialize(&mut self) -> TranscriptUpdate {
        let Some(persistence) = self.persistence.take() else {
            self.seed_defaults();
            self.transcript.restart_with(CREATED_DEFAULTS);
            return self.whole_transcript();
        };

        let identity = match persistence.store.init().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "store unavailable; continuing locally");
                self.seed_defaults();
                self.transcript.restart_with(CREATED_DEFAULTS);
                self.transcript.push(TranscriptEntry::error(format!(
                    "Persistence unavailable ({}). Using local session.",
                    e
                )));
                return self.whole_transcript();
            }
        };
        info!(%identity, "session store ready");

        let store = persistence.store.clone();
        let saver = AutoSaver::spawn(store.clone(), persistence.delay, self.status.clone());
        self.persistence = Some(Persistence {
            saver: Some(saver),
            ..persistence
        });

        match store.load().await {
            Ok(Some(image)) => match self.engine.import(&image) {
                Ok(()) => {
                    self.refresh_schema();
                    self.transcript.restart_with(RESTORED);
                    self.status.send_replace(SyncStatus::Loaded);
                }
                Err(e) => {
                    warn!(error = %e, "stored image rejected");
                    self.seed_defaults();
                    self.transcript.restart_with(CREATED_DEFAULTS);
                    self.transcript.push(TranscriptEntry::error(format!(
                        "ERROR: saved session could not be restored: {}",
                        e
                    )));
                }
            },
            Ok(None) => {
                self.seed_defaults();
                self.transcript.restart_with(CREATED_DEFAULTS);
                self.save_now().await;
            }
            Err(e) => {
                warn!(error = %e, "loading stored session failed");
                self.status.send_replace(SyncStatus::Failed(e.to_string()));
                self.seed_defaults();
                self.transcript.restart_with(CREATED_DEFAULTS);
            }
        }
        self.whole_transcript()
    }

    /// Process one submitted line.
    pub fn submit(&mut self, line: &str) -> TranscriptUpdate {
        let mark = self.transcript.len();
        self.transcript
            .push(TranscriptEntry::command(self.assembler.prompt(), line));
        self.history.record(line);

        match self.assembler.accept(line) {
            Action::Nothing | Action::Continue { .. } => {}
            Action::Meta(MetaCommand::Clear) => {
                self.transcript.clear();
                return self.whole_transcript();
            }
            Action::Meta(MetaCommand::Help) => {
                self.transcript.push(TranscriptEntry::output(HELP));
            }
            Action::Meta(MetaCommand::Describe(table)) => self.describe(&table),
            Action::Meta(MetaCommand::SetLineSize(0)) => {
                self.transcript.push(TranscriptEntry::error(
                    "ERROR: LINESIZE must be a positive integer",
                ));
            }
            Action::Meta(MetaCommand::SetLineSize(width)) => {
                self.settings.line_width = width;
                self.transcript
                    .push(TranscriptEntry::output(format!("LINESIZE set to {}", width)));
            }
            Action::Execute(statement) => self.execute(&statement),
        }

        self.update_since(mark)
    }

    /// Save the current image immediately, cancelling any scheduled save.
    pub async fn force_save(&mut self) -> TranscriptUpdate {
        let mark = self.transcript.len();
        let ok = self.save_now().await;
        self.transcript.push(TranscriptEntry::output(format!(
            "> Force save to cloud {}.",
            if ok { "succeeded" } else { "failed" }
        )));
        self.update_since(mark)
    }

    /// Replace the database with the image in the file at `path`.
    pub fn import_file(&mut self, path: &Path) -> TranscriptUpdate {
        let name = display_name(path);
        match std::fs::read(path) {
            Ok(image) => self.import_image(&name, &image),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read session file");
                self.import_failed(&name)
            }
        }
    }

    /// Replace the database with `image`, naming it `name` in messages.
    ///
    /// On success the transcript restarts and the buffer is emptied; on
    /// failure nothing but the transcript changes.
    pub fn import_image(&mut self, name: &str, image: &[u8]) -> TranscriptUpdate {
        match self.engine.import(image) {
            Ok(()) => {
                info!(file = %name, bytes = image.len(), "session imported");
                self.assembler.reset();
                self.refresh_schema();
                self.transcript
                    .restart_with(format!("> Session restored from file: {}", name));
                self.schedule_save();
                self.whole_transcript()
            }
            Err(e) => {
                warn!(file = %name, error = %e, "session import rejected");
                self.import_failed(name)
            }
        }
    }

    /// Write the current image to `path`.
    pub fn export_file(&mut self, path: &Path) -> TranscriptUpdate {
        let mark = self.transcript.len();
        let result = self
            .engine
            .export()
            .map_err(|e| e.to_string())
            .and_then(|image| std::fs::write(path, image).map_err(|e| e.to_string()));
        let entry = match result {
            Ok(()) => {
                info!(path = %path.display(), "session exported");
                TranscriptEntry::output(format!("> Session exported to {}.", path.display()))
            }
            Err(e) => TranscriptEntry::error(format!("> Export failed: {}", e)),
        };
        self.transcript.push(entry);
        self.update_since(mark)
    }

    /// Write any scheduled save and stop the saver.
    pub async fn shutdown(&mut self) {
        if let Some(saver) = self.persistence.as_mut().and_then(|p| p.saver.take()) {
            saver.shutdown().await;
        }
    }

    pub fn recall_previous(&mut self) -> Option<&str> {
        self.history.recall_previous()
    }

    pub fn recall_next(&mut self) -> &str {
        self.history.recall_next()
    }

    pub fn prompt(&self) -> String {
        self.assembler.prompt()
    }

    pub fn depth(&self) -> usize {
        self.assembler.depth()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn settings(&self) -> ExecutionSettings {
        self.settings
    }

    /// Handle to the latest schema snapshot, for completion front ends.
    pub fn schema(&self) -> SharedSchema {
        self.schema.clone()
    }

    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    fn execute(&mut self, statement: &str) {
        debug!(%statement, "executing");
        match self.engine.execute(statement) {
            Ok(output) => {
                let text = if output.has_result_set() {
                    render_result(&output, self.settings.line_width)
                } else {
                    summary(statement, output.rows_modified)
                };
                self.transcript.push(TranscriptEntry::output(text));

                let verb = first_word(statement);
                if STRUCTURAL.contains(&verb.as_str()) {
                    self.refresh_schema();
                }
                if MODIFYING.contains(&verb.as_str()) {
                    self.schedule_save();
                }
            }
            Err(e) => {
                debug!(error = %e, "statement failed");
                self.transcript
                    .push(TranscriptEntry::error(format!("ERROR: {}", e)));
            }
        }
    }

    fn describe(&mut self, table: &str) {
        let entry = match self.engine.describe_table(table) {
            Ok(columns) => {
                let rows: Vec<Vec<String>> = columns
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            if c.not_null { "NOT NULL" } else { "" }.to_string(),
                            c.declared_type.clone(),
                        ]
                    })
                    .collect();
                TranscriptEntry::output(render_table(
                    &["Name", "Null?", "Type"],
                    &rows,
                    self.settings.line_width,
                ))
            }
            Err(e) => TranscriptEntry::error(format!("ERROR: {}", e)),
        };
        self.transcript.push(entry);
    }

    fn seed_defaults(&mut self) {
        if let Err(e) = self.engine.execute(DEFAULT_SCHEMA_SQL) {
            warn!(error = %e, "could not create default tables");
        }
        self.refresh_schema();
    }

    /// Re-read the schema and publish a fresh snapshot.
    pub fn refresh_schema(&mut self) {
        let engine: &mut dyn Engine = self.engine.as_mut();
        if let Err(e) = self.schema_cache.refresh(engine) {
            warn!(error = %e, "schema refresh failed");
            return;
        }
        let snapshot = self.schema_cache.snapshot(engine);
        match self.schema.write() {
            Ok(mut shared) => *shared = snapshot,
            Err(e) => warn!(error = %e, "schema handle poisoned"),
        }
    }

    fn schedule_save(&mut self) {
        let Some(saver) = self.persistence.as_ref().and_then(|p| p.saver.as_ref()) else {
            return;
        };
        match self.engine.export() {
            Ok(image) => saver.schedule(image),
            Err(e) => snapshot_failed(&self.status, e),
        }
    }

    /// Flush the current image through the saver. `false` when there is no
    /// store or the save failed.
    async fn save_now(&mut self) -> bool {
        let Some(saver) = self.persistence.as_ref().and_then(|p| p.saver.as_ref()) else {
            return false;
        };
        match self.engine.export() {
            Ok(image) => saver.flush(image).await.is_ok(),
            Err(e) => {
                snapshot_failed(&self.status, e);
                false
            }
        }
    }

    fn import_failed(&mut self, name: &str) -> TranscriptUpdate {
        let mark = self.transcript.len();
        self.transcript.push(TranscriptEntry::error(format!(
            "> Failed to load session file {}. Is it a valid database file?",
            name
        )));
        self.update_since(mark)
    }

    fn update_since(&self, mark: usize) -> TranscriptUpdate {
        TranscriptUpdate {
            cleared: false,
            entries: self.transcript.since(mark).to_vec(),
        }
    }

    fn whole_transcript(&self) -> TranscriptUpdate {
        TranscriptUpdate {
            cleared: true,
            entries: self.transcript.entries().to_vec(),
        }
    }
}

fn first_word(statement: &str) -> String {
    statement
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn snapshot_failed(status: &StatusSender, e: EngineError) {
    warn!(error = %e, "could not snapshot database");
    status.send_replace(SyncStatus::Failed(e.to_string()));
}
