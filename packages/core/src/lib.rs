//! sqlpad core: everything between a line editor and a SQL engine.
//!
//! - `StatementAssembler`: turns submitted lines into statements and
//!   meta-commands
//! - `autocomplete`: context-aware single-suggestion completion
//! - `format`: fixed-width result rendering, and parsing it back
//! - `SchemaCache`: lazily introspected table and column metadata
//! - `Session`: the state machine a front end drives
//! - `AutoSaver`: debounced writes to a `SessionStore`
//!
//! The engine and the store are traits; concrete ones live in
//! `sqlpad-sqlite` and `sqlpad-cloud`.
//!
//! # Example
//!
//! ```rust
//! use sqlpad_core::{Action, StatementAssembler};
//!
//! let mut asm = StatementAssembler::new();
//! assert_eq!(asm.accept("SELECT *"), Action::Continue { depth: 1 });
//! assert_eq!(
//!     asm.accept("FROM jobs;"),
//!     Action::Execute("SELECT * FROM jobs".to_string())
//! );
//! ```

pub mod assembler;
pub mod autocomplete;
mod engine;
mod error;
pub mod format;
mod history;
pub mod keywords;
pub mod persist;
pub mod schema;
pub mod session;
mod transcript;

pub use assembler::{Action, MetaCommand, StatementAssembler};
pub use autocomplete::Completion;
pub use engine::{ColumnInfo, Engine, QueryOutput, Value};
pub use error::{EngineError, PersistError};
pub use format::{parse_rendered, Block, ParsedTable};
pub use history::CommandHistory;
pub use persist::{AutoSaver, IdentityProvider, MemoryStore, SessionStore, SyncStatus};
pub use schema::{ColumnSchema, Schema, SchemaCache, SemanticType, SharedSchema, TableSchema};
pub use session::{ExecutionSettings, Session, TranscriptUpdate};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
