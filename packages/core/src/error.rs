//! Error types shared by engines and session stores.

/// Errors raised by a relational [`Engine`](crate::engine::Engine).
///
/// The `Display` form of [`EngineError::Sql`] is the raw engine message; the
/// session prefixes it with `ERROR:` when it lands in the transcript.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine rejected or failed to run a statement.
    #[error("{0}")]
    Sql(String),

    /// Structural introspection of a table that does not exist.
    #[error("table '{0}' does not exist")]
    NoSuchTable(String),

    /// Serializing the live database failed.
    #[error("snapshot failed: {0}")]
    Snapshot(String),

    /// Bytes handed to `import` are not a usable database image.
    #[error("invalid database image: {0}")]
    InvalidImage(String),
}

/// Errors raised by a [`SessionStore`](crate::persist::SessionStore) or
/// [`IdentityProvider`](crate::persist::IdentityProvider).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("identity unavailable: {0}")]
    Identity(String),

    /// The store was used before `init` succeeded, or it has been shut down.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_error_displays_raw_message() {
        let err = EngineError::Sql("no such table: foo".to_string());
        assert_eq!(err.to_string(), "no such table: foo");
    }

    #[test]
    fn no_such_table_names_the_table() {
        let err = EngineError::NoSuchTable("ghosts".to_string());
        assert_eq!(err.to_string(), "table 'ghosts' does not exist");
    }

    #[test]
    fn status_error_includes_code_and_url() {
        let err = PersistError::Status {
            status: 503,
            url: "http://localhost/users/1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 503 from http://localhost/users/1"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PersistError = io.into();
        assert!(matches!(err, PersistError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
