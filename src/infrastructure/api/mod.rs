//! PBX REST API adapters

mod client;
mod credential;

pub use client::{ApiRoutes, PbxApiClient};
pub use credential::Credential;
