//! Sentinel-value interface kept for callers written against the historical
//! behaviour: failures become empty or absent values, never errors. Details
//! of every failure are still logged by `VaultSecretClient`.

use crate::secrets::service::VaultSecretClient;
use crate::utils::errors::Result;
use crate::vault::config::VaultConfig;
use crate::vault::kv::Secret;
use serde::Serialize;

pub struct LegacySecrets {
    inner: VaultSecretClient,
}

impl LegacySecrets {
    /// Load configuration and connect. Fails only when no usable
    /// configuration or CA bundle exists.
    pub fn load() -> Result<Self> {
        Ok(Self::new(VaultSecretClient::from_default_config()?))
    }

    pub fn from_config(config: &VaultConfig) -> Result<Self> {
        Ok(Self::new(VaultSecretClient::new(config)?))
    }

    pub fn new(inner: VaultSecretClient) -> Self {
        Self { inner }
    }

    pub fn client(&self) -> &VaultSecretClient {
        &self.inner
    }

    /// The secret's data, or an empty map if it could not be read
    pub async fn get_secret(&self, id: &str, repo: &str) -> Secret {
        self.inner.get_secret(id, repo).await.unwrap_or_default()
    }

    /// `(username, password)`, or `(None, None)` when the secret lacks the
    /// keys *or* could not be read. The two cases are indistinguishable.
    pub async fn get_user_pwd(&self, id: &str, repo: &str) -> (Option<String>, Option<String>) {
        match self.inner.get_user_pwd(id, repo).await {
            Ok(Some(pair)) => (Some(pair.username), Some(pair.password)),
            Ok(None) | Err(_) => (None, None),
        }
    }

    /// Keys at the root of the mount, or `None` on failure
    pub async fn list_secret(&self, repo: &str) -> Option<Vec<String>> {
        self.inner.list_secret(repo).await.ok()
    }

    /// Status code of the write, or `None` when the version read (or the
    /// connection) failed and nothing was written
    pub async fn upd_secret<T>(&self, id: &str, data: &T, repo: &str) -> Option<u16>
    where
        T: Serialize + ?Sized,
    {
        self.inner
            .upd_secret(id, data, repo)
            .await
            .ok()
            .map(|outcome| outcome.status.as_u16())
    }
}
