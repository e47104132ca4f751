//! OAuth2 client-credentials authentication for HaloPSA.
//!
//! [`CredentialStore`] holds the token; [`Session`] decides when a new one
//! is needed and fetches it.

mod credentials;
mod session;

pub use credentials::*;
pub use session::*;
