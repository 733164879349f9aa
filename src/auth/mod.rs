//! Authentication module
//!
//! Obtains bearer tokens with the OAuth2 client-credentials grant and keeps
//! them in an in-memory cache until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthSource, CachedToken};
