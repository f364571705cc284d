//! Schema snapshots and the cache that builds them from an engine.
//!
//! A [`Schema`] is an immutable value: the cache builds a fresh one on every
//! [`SchemaCache::snapshot`] and the session publishes it whole, so readers
//! never observe a half-refreshed table list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{ColumnInfo, Engine};
use crate::error::EngineError;

/// Coarse type class of a column, used to pick a literal placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    String,
    Number,
    Date,
    Boolean,
}

impl SemanticType {
    /// Classify a declared column type.
    ///
    /// Substring tests run in order on the upper-cased text, so `DATETIME`
    /// is a date and `BIGINT` a number. Anything unrecognized is a string.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_uppercase();
        let has = |needles: &[&str]| needles.iter().any(|n| upper.contains(n));

        if has(&["BOOL"]) {
            SemanticType::Boolean
        } else if has(&["INT"]) {
            SemanticType::Number
        } else if has(&["CHAR", "CLOB", "TEXT"]) {
            SemanticType::String
        } else if has(&["DATE", "TIME"]) {
            SemanticType::Date
        } else if has(&["REAL", "FLOA", "DOUB", "NUM", "DEC"]) {
            SemanticType::Number
        } else {
            SemanticType::String
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

impl From<&ColumnInfo> for ColumnSchema {
    fn from(info: &ColumnInfo) -> Self {
        Self::new(info.name.clone(), SemanticType::from_declared(&info.declared_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

/// Ordered table → columns mapping.
///
/// Table order is the engine's listing order; lookups that can match more
/// than one table take the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// Convenience builder used by tests and fixtures.
    pub fn with_table(mut self, name: &str, columns: &[(&str, SemanticType)]) -> Self {
        self.tables.push(TableSchema {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(n, t)| ColumnSchema::new(*n, *t))
                .collect(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Every column name of every table, in table then column order.
    /// Names shared by several tables appear once per table.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.name.as_str()))
    }

    /// First table whose name starts with `prefix`, case-insensitively.
    pub fn table_with_prefix(&self, prefix: &str) -> Option<&TableSchema> {
        let prefix = prefix.to_lowercase();
        self.tables
            .iter()
            .find(|t| t.name.to_lowercase().starts_with(&prefix))
    }

    /// Semantic type of the first column named `column` in any table.
    ///
    /// The owning table is not considered, so a name shared by tables with
    /// different types resolves to the first table's type.
    pub fn semantic_type_of(&self, column: &str) -> Option<SemanticType> {
        self.tables
            .iter()
            .flat_map(|t| t.columns.iter())
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .map(|c| c.semantic_type)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names().any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// A schema handle shared between the session and completion front ends.
pub type SharedSchema = Arc<RwLock<Schema>>;

/// Lazily populated view of the engine's tables and columns.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: Vec<String>,
    columns: HashMap<String, Vec<ColumnSchema>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the table listing and forget every cached column list.
    pub fn refresh(&mut self, engine: &mut dyn Engine) -> Result<(), EngineError> {
        self.tables = engine.list_tables()?;
        self.columns.clear();
        debug!(tables = self.tables.len(), "schema refreshed");
        Ok(())
    }

    pub fn list_tables(&self) -> &[String] {
        &self.tables
    }

    /// Columns of `table`, introspecting on first use.
    pub fn columns_of(
        &mut self,
        engine: &mut dyn Engine,
        table: &str,
    ) -> Result<&[ColumnSchema], EngineError> {
        if !self.columns.contains_key(table) {
            let columns: Vec<ColumnSchema> = engine
                .describe_table(table)?
                .iter()
                .map(ColumnSchema::from)
                .collect();
            self.columns.insert(table.to_string(), columns);
        }
        Ok(self.columns.get(table).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Build a complete [`Schema`], loading any table not yet introspected.
    ///
    /// A table whose introspection fails is kept with no columns.
    pub fn snapshot(&mut self, engine: &mut dyn Engine) -> Schema {
        let names = self.tables.clone();
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = match self.columns_of(engine, &name) {
                Ok(columns) => columns.to_vec(),
                Err(e) => {
                    warn!(table = %name, error = %e, "could not introspect table");
                    Vec::new()
                }
            };
            tables.push(TableSchema { name, columns });
        }
        Schema::new(tables)
    }
}
