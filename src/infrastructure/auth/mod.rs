//! Credential acquisition

mod sso;

pub use sso::{AuthError, SsoClient, SsoSession};
