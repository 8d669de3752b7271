//! Server credential storage backed by the platform keyring.

use keyring::Entry;
use stride_domain::{Result, ServerCredentials, StrideError};
use tracing::{debug, info};

const ACCOUNT: &str = "server";

/// Trait for persisting the server connection credentials.
///
/// Absence of stored credentials is `Ok(None)`, not an error: it is the
/// "not connected" state.
pub trait CredentialStore: Send + Sync {
    fn save(&self, credentials: &ServerCredentials) -> Result<()>;
    fn load(&self) -> Result<Option<ServerCredentials>>;
    fn clear(&self) -> Result<()>;
}

/// Keyring-backed credential store.
///
/// Credentials are stored as one JSON secret under the configured service
/// name. Clearing this store together with the sync status store is the
/// "disconnect" operation.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, ACCOUNT)
            .map_err(|e| StrideError::Auth(format!("keyring unavailable: {e}")))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, credentials: &ServerCredentials) -> Result<()> {
        let secret = serde_json::to_string(credentials)
            .map_err(|e| StrideError::Internal(format!("credential serialization: {e}")))?;
        self.entry()?
            .set_password(&secret)
            .map_err(|e| StrideError::Auth(format!("keyring write failed: {e}")))?;
        info!(service = %self.service, "server credentials saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<ServerCredentials>> {
        match self.entry()?.get_password() {
            Ok(secret) => {
                let credentials = serde_json::from_str(&secret).map_err(|e| {
                    StrideError::Auth(format!("stored credentials are corrupt: {e}"))
                })?;
                Ok(Some(credentials))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "no stored credentials");
                Ok(None)
            }
            Err(e) => Err(StrideError::Auth(format!("keyring read failed: {e}"))),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!(service = %self.service, "server credentials cleared");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StrideError::Auth(format!("keyring delete failed: {e}"))),
        }
    }
}
