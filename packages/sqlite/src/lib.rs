//! An in-memory SQLite [`Engine`] for sqlpad.
//!
//! The whole database lives in one connection's memory. Snapshots are the
//! SQLite file format, so an exported image can be opened by any SQLite tool
//! and any SQLite file can be imported.

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use sqlpad_core::{ColumnInfo, Engine, EngineError, QueryOutput, Value};
use tracing::{debug, info};

const MAIN: &str = "main";

pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// A fresh, empty in-memory database.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(sql_error)?;
        Ok(Self { conn })
    }

    /// An in-memory database initialized from `image`.
    pub fn from_image(image: &[u8]) -> Result<Self, EngineError> {
        Ok(Self {
            conn: load_image(image)?,
        })
    }
}

impl Engine for SqliteEngine {
    /// Run every statement in `sql`. The first result set is returned;
    /// statements without one contribute to the change count.
    fn execute(&mut self, sql: &str) -> Result<QueryOutput, EngineError> {
        let mut batch = Batch::new(&self.conn, sql);
        let mut result: Option<QueryOutput> = None;
        let mut modified: u64 = 0;

        while let Some(mut stmt) = batch.next().map_err(sql_error)? {
            if stmt.column_count() == 0 {
                let changed = stmt.execute([]).map_err(sql_error)?;
                modified += changed as u64;
                continue;
            }

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();
            let mut rows = stmt.query([]).map_err(sql_error)?;
            let mut values = Vec::new();
            while let Some(row) = rows.next().map_err(sql_error)? {
                let mut record = Vec::with_capacity(width);
                for i in 0..width {
                    record.push(value_of(row.get_ref(i).map_err(sql_error)?));
                }
                values.push(record);
            }
            if result.is_none() {
                result = Some(QueryOutput::rows(columns, values));
            }
        }

        debug!(modified, has_rows = result.is_some(), "batch finished");
        Ok(result.unwrap_or_else(|| QueryOutput::modified(modified)))
    }

    fn list_tables(&mut self) -> Result<Vec<String>, EngineError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_schema \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
            )
            .map_err(sql_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sql_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql_error)?;
        Ok(names)
    }

    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>, EngineError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, \"notnull\" FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(sql_error)?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? != 0,
                ))
            })
            .map_err(sql_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql_error)?;

        if columns.is_empty() {
            return Err(EngineError::NoSuchTable(table.to_string()));
        }
        Ok(columns)
    }

    fn export(&mut self) -> Result<Vec<u8>, EngineError> {
        let data = self
            .conn
            .serialize(MAIN)
            .map_err(|e| EngineError::Snapshot(e.to_string()))?;
        Ok(data.to_vec())
    }

    /// Load `image` into a new connection and swap it in only once the image
    /// has been read successfully.
    fn import(&mut self, image: &[u8]) -> Result<(), EngineError> {
        self.conn = load_image(image)?;
        info!(bytes = image.len(), "database image loaded");
        Ok(())
    }
}

fn load_image(image: &[u8]) -> Result<Connection, EngineError> {
    let invalid = |e: rusqlite::Error| EngineError::InvalidImage(e.to_string());

    let mut conn = Connection::open_in_memory().map_err(sql_error)?;
    conn.deserialize_read_exact(MAIN, image, image.len(), false)
        .map_err(invalid)?;
    // The header is only checked once a page is read.
    conn.query_row("SELECT count(*) FROM sqlite_schema", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(invalid)?;
    Ok(conn)
}

fn value_of(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn sql_error(e: rusqlite::Error) -> EngineError {
    match e {
        rusqlite::Error::SqliteFailure(_, Some(message)) => EngineError::Sql(message),
        other => EngineError::Sql(other.to_string()),
    }
}
