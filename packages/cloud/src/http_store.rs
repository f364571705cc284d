//! A [`SessionStore`] backed by a JSON document service.
//!
//! ```text
//! GET {base}/users/{id}   -> 200 {"dbState": ..., "lastSaved": ...} | 404
//! PUT {base}/users/{id}   <- {"dbState": ..., "lastSaved": ...}
//! ```

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sqlpad_core::{IdentityProvider, PersistError, SessionStore};
use tracing::{debug, info};
use url::Url;

use crate::document::SessionDocument;
use crate::error::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpSessionStore {
    client: Client,
    base_url: Url,
    identity: Arc<dyn IdentityProvider>,
    document: OnceLock<Url>,
}

impl HttpSessionStore {
    /// A store rooted at `base_url`. Nothing is contacted until `init`.
    pub fn new(base_url: &str, identity: Arc<dyn IdentityProvider>) -> Result<Self, Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(client, base_url, identity)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                message: format!("{} cannot be a base URL", base_url),
            });
        }
        Ok(Self {
            client,
            base_url,
            identity,
            document: OnceLock::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The document URL, once `init` has resolved the identity.
    pub fn document_url(&self) -> Option<&Url> {
        self.document.get()
    }

    fn resolve(&self, id: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push("users")
            .push(id);
        Ok(url)
    }

    fn require_document(&self) -> Result<&Url, PersistError> {
        self.document
            .get()
            .ok_or_else(|| PersistError::Unavailable("store used before init".to_string()))
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn init(&self) -> Result<String, PersistError> {
        let id = self.identity.identify().await?;
        let url = self.resolve(&id)?;
        info!(%url, "remote session store");
        let _ = self.document.set(url);
        Ok(id)
    }

    async fn save(&self, image: &[u8]) -> Result<(), PersistError> {
        let url = self.require_document()?;
        let response = self
            .client
            .put(url.clone())
            .json(&SessionDocument::new(image))
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        debug!(bytes = image.len(), "document written");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        let url = self.require_document()?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "no stored document");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PersistError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let document: SessionDocument = response.json().await.map_err(Error::from)?;
        Ok(Some(document.image()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentity;

    fn store(base: &str) -> HttpSessionStore {
        HttpSessionStore::new(base, Arc::new(StaticIdentity::new("u1"))).unwrap()
    }

    #[test]
    fn document_path_is_appended_to_base_path() {
        let s = store("https://example.com/api/");
        assert_eq!(
            s.resolve("u1").unwrap().as_str(),
            "https://example.com/api/users/u1"
        );
        let s = store("https://example.com/api");
        assert_eq!(
            s.resolve("u1").unwrap().as_str(),
            "https://example.com/api/users/u1"
        );
    }

    #[test]
    fn identity_is_escaped_as_one_segment() {
        let s = store("https://example.com");
        assert_eq!(
            s.resolve("a/b").unwrap().as_str(),
            "https://example.com/users/a%2Fb"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let result =
            HttpSessionStore::new("mailto:someone@example.com", Arc::new(StaticIdentity::new("u")));
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn save_before_init_is_unavailable() {
        let s = store("https://example.com");
        assert!(matches!(
            s.save(b"x").await,
            Err(PersistError::Unavailable(_))
        ));
        assert!(s.document_url().is_none());
    }
}
