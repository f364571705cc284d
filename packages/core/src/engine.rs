//! The relational engine seam.
//!
//! The session never talks SQL to anything but an [`Engine`]. The embedded
//! implementation lives in `sqlpad-sqlite`; tests use in-memory fakes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

/// What one call to [`Engine::execute`] produced.
///
/// `columns` is empty for statements that return no result set; in that case
/// `rows_modified` carries the engine's change count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub rows_modified: u64,
}

impl QueryOutput {
    /// Output of a statement that changed `n` rows and returned nothing.
    pub fn modified(n: u64) -> Self {
        Self {
            rows_modified: n,
            ..Self::default()
        }
    }

    /// Output of a query.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            rows_modified: 0,
        }
    }

    pub fn has_result_set(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// One row of structural introspection for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type text exactly as the engine reports it (may be empty).
    pub declared_type: String,
    pub not_null: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, not_null: bool) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            not_null,
        }
    }
}

/// A relational execution engine.
pub trait Engine: Send {
    /// Execute statement text. Multi-statement text is allowed; the first
    /// statement that yields a result set determines the returned rows.
    fn execute(&mut self, sql: &str) -> Result<QueryOutput, EngineError>;

    /// User table names, in the engine's listing order.
    fn list_tables(&mut self) -> Result<Vec<String>, EngineError>;

    /// Ordered column descriptors of `table`.
    ///
    /// Returns [`EngineError::NoSuchTable`] when the table is unknown.
    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>, EngineError>;

    /// Serialize the whole database to an opaque byte image.
    fn export(&mut self) -> Result<Vec<u8>, EngineError>;

    /// Replace the whole database with a previously exported image.
    ///
    /// The image is validated first; on error the live database is untouched.
    fn import(&mut self, image: &[u8]) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn execute(&mut self, sql: &str) -> Result<QueryOutput, EngineError> {
        (**self).execute(sql)
    }

    fn list_tables(&mut self) -> Result<Vec<String>, EngineError> {
        (**self).list_tables()
    }

    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>, EngineError> {
        (**self).describe_table(table)
    }

    fn export(&mut self) -> Result<Vec<u8>, EngineError> {
        (**self).export()
    }

    fn import(&mut self, image: &[u8]) -> Result<(), EngineError> {
        (**self).import(image)
    }
}
