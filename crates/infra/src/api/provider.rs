//! Gateway provider driven by the stored credentials.

use std::sync::Arc;

use async_trait::async_trait;
use stride_core::{SyncGateway, SyncGatewayProvider};
use tracing::{debug, warn};

use super::client::{ApiClient, ApiClientConfig};
use crate::credentials::CredentialStore;

/// Resolves a `SyncGateway` from the credential store on each call.
///
/// Missing credentials, a broken keyring, or a client that cannot be built
/// all yield `None`: the sync engine reports NotConnected instead of
/// failing.
pub struct CredentialGatewayProvider {
    credentials: Arc<dyn CredentialStore>,
}

impl CredentialGatewayProvider {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl SyncGatewayProvider for CredentialGatewayProvider {
    async fn gateway(&self) -> Option<Arc<dyn SyncGateway>> {
        let credentials = match self.credentials.load() {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("no server credentials stored");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "failed to load server credentials");
                return None;
            }
        };

        match ApiClient::new(ApiClientConfig::from_credentials(&credentials)) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn SyncGateway>),
            Err(err) => {
                warn!(error = %err, "failed to build run API client");
                None
            }
        }
    }
}
