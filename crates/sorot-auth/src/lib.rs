//! Sorot Auth - Google Cloud credential resolution.
//!
//! Resolves OAuth2 bearer tokens for the storage, analyzer and search
//! clients without pulling in a full SDK.

mod error;
mod provider;

pub use error::{AuthError, AuthResult};
pub use provider::TokenProvider;
