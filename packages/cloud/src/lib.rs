//! Session stores for sqlpad.
//!
//! - [`HttpSessionStore`]: one JSON document per identity on a remote
//!   document service
//! - [`FileSessionStore`]: the raw image in a local file
//!
//! Identities come from an [`IdentityProvider`](sqlpad_core::IdentityProvider):
//! [`LocalIdentity`] keeps a generated UUID on disk, [`StaticIdentity`] is
//! supplied by the caller.

mod document;
mod error;
mod file_store;
mod http_store;
mod identity;

pub use document::SessionDocument;
pub use error::Error;
pub use file_store::FileSessionStore;
pub use http_store::HttpSessionStore;
pub use identity::{LocalIdentity, StaticIdentity};
