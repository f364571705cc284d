use sqlpad_core::PersistError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Error> for PersistError {
    fn from(error: Error) -> Self {
        match error {
            Error::Http(e) if e.is_decode() => PersistError::Decode(e.to_string()),
            Error::Http(e) => PersistError::Http(e.to_string()),
            Error::Json(e) => PersistError::Decode(e.to_string()),
            Error::Base64(e) => PersistError::Decode(e.to_string()),
            Error::Io(e) => PersistError::Io(e),
            other => PersistError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_map_to_decode() {
        let err: PersistError = Error::Base64(base64::DecodeError::InvalidLength(3)).into();
        assert!(matches!(err, PersistError::Decode(_)));
    }

    #[test]
    fn bad_urls_make_the_store_unavailable() {
        let err: PersistError = Error::InvalidUrl {
            message: "no host".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "store unavailable: Invalid URL: no host");
    }
}
