//! Remote run API adapter.

pub mod client;
pub mod provider;

pub use client::{ApiClient, ApiClientConfig};
pub use provider::CredentialGatewayProvider;
