use crate::utils::errors::{Result, VaultKvError};
use crate::vault::client::{VaultClient, VaultResponse};
use crate::vault::config::VaultConfig;
use crate::vault::kv::{
    data_path, metadata_path, CasWriteRequest, KvListResponse, KvReadResponse, KvWriteResponse,
    Secret, SecretVersion,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Mount used when the caller does not name one
pub const DEFAULT_REPO: &str = "secret";

/// A secret together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSecret {
    pub data: Secret,
    pub version: SecretVersion,
}

/// The `username` and `password` entries of a secret
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl CredentialPair {
    /// Project a secret onto its credential keys. Both must be present and
    /// non-null.
    pub fn from_secret(secret: &Secret) -> Option<Self> {
        let username = value_to_string(secret.get("username")?)?;
        let password = value_to_string(secret.get("password")?)?;
        Some(Self { username, password })
    }
}

/// Result of a check-and-set write. The status is whatever Vault answered.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub status: StatusCode,
    /// New version reported by Vault on success
    pub version: Option<SecretVersion>,
    pub body: String,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Vault rejected the write because the CAS version was stale
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::BAD_REQUEST && self.body.contains("check-and-set")
    }
}

/// Reads, lists and updates secrets in a KV-v2 engine
pub struct VaultSecretClient {
    client: VaultClient,
}

impl VaultSecretClient {
    pub fn new(config: &VaultConfig) -> Result<Self> {
        Ok(Self {
            client: VaultClient::new(config)?,
        })
    }

    /// Load configuration from the default locations and connect
    pub fn from_default_config() -> Result<Self> {
        let config = VaultConfig::load()?;
        Self::new(&config)
    }

    pub fn with_client(client: VaultClient) -> Self {
        Self { client }
    }

    /// Get vault address
    pub fn vault_addr(&self) -> &str {
        self.client.vault_addr()
    }

    /// Read a secret and the version it is currently at
    pub async fn read_secret(&self, id: &str, repo: &str) -> Result<VersionedSecret> {
        let path = data_path(repo, id);
        let response = self
            .client
            .get(&path)
            .await
            .inspect_err(|e| tracing::error!("Vault request for {path} failed: {e}"))?;
        let response = log_read_failure(&path, response)?;

        let parsed: KvReadResponse = serde_json::from_str(&response.body).map_err(|e| {
            VaultKvError::MalformedResponse(format!("{path}: {e}"))
        })?;

        Ok(VersionedSecret {
            data: parsed.data.data.unwrap_or_default(),
            version: parsed.data.metadata.version,
        })
    }

    /// Fetch the key/value payload of a secret
    pub async fn get_secret(&self, id: &str, repo: &str) -> Result<Secret> {
        Ok(self.read_secret(id, repo).await?.data)
    }

    /// Fetch the `username`/`password` pair of a secret.
    /// `Ok(None)` when the secret lacks either key.
    pub async fn get_user_pwd(&self, id: &str, repo: &str) -> Result<Option<CredentialPair>> {
        let secret = self.get_secret(id, repo).await?;
        let pair = CredentialPair::from_secret(&secret);
        if pair.is_none() {
            tracing::debug!("Secret {repo}/{id} has no username/password pair");
        }
        Ok(pair)
    }

    /// List the keys at the root of a mount
    pub async fn list_secret(&self, repo: &str) -> Result<Vec<String>> {
        self.list_keys(&metadata_path(repo, None)).await
    }

    /// List the keys below a folder of a mount
    pub async fn list_secret_under(&self, folder: &str, repo: &str) -> Result<Vec<String>> {
        self.list_keys(&metadata_path(repo, Some(folder))).await
    }

    /// Replace a secret's data, using its current version as the CAS token.
    ///
    /// Two round trips: a read for the version, then the write. A failed
    /// read aborts before anything is written. A failed write is not an
    /// error; its status comes back in the `WriteOutcome`.
    pub async fn upd_secret<T>(&self, id: &str, data: &T, repo: &str) -> Result<WriteOutcome>
    where
        T: Serialize + ?Sized,
    {
        let current = self.read_secret(id, repo).await?;
        tracing::debug!("Updating {repo}/{id} from version {}", current.version);
        self.write_secret_cas(id, data, current.version, repo).await
    }

    /// Overlay `data` on a secret's current keys and write the result with
    /// check-and-set. Keys not named in `data` keep their stored values.
    pub async fn merge_secret(&self, id: &str, data: &Secret, repo: &str) -> Result<WriteOutcome> {
        let current = self.read_secret(id, repo).await?;
        let mut merged = current.data;
        merged.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        tracing::debug!(
            "Merging {} key(s) into {repo}/{id} at version {}",
            data.len(),
            current.version
        );
        self.write_secret_cas(id, &merged, current.version, repo).await
    }

    /// Write a secret only if it is still at `version`
    pub async fn write_secret_cas<T>(
        &self,
        id: &str,
        data: &T,
        version: SecretVersion,
        repo: &str,
    ) -> Result<WriteOutcome>
    where
        T: Serialize + ?Sized,
    {
        let path = data_path(repo, id);
        let body = CasWriteRequest::new(version, data);
        let response = self
            .client
            .post(&path, &body)
            .await
            .inspect_err(|e| tracing::warn!("Vault update of {path} failed: {e}"))?;

        let outcome = WriteOutcome {
            status: response.status,
            version: written_version(&response),
            body: response.body,
        };

        if outcome.is_success() {
            tracing::info!(
                "Updated {path} to version {}",
                outcome
                    .version
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
        } else if outcome.is_conflict() {
            tracing::warn!(
                "Vault update error for {path}: version {version} is stale ({})",
                outcome.status
            );
        } else {
            tracing::warn!(
                "Vault update error for {path}: {} {}",
                outcome.status,
                outcome.body
            );
        }

        Ok(outcome)
    }

    async fn list_keys(&self, path: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .list(path)
            .await
            .inspect_err(|e| tracing::error!("Vault list of {path} failed: {e}"))?;
        let response = log_read_failure(path, response)?;

        let parsed: KvListResponse = serde_json::from_str(&response.body)
            .map_err(|e| VaultKvError::MalformedResponse(format!("{path}: {e}")))?;
        tracing::debug!("Listed {} keys under {path}", parsed.data.keys.len());
        Ok(parsed.data.keys)
    }
}

fn log_read_failure(path: &str, response: VaultResponse) -> Result<VaultResponse> {
    if !response.is_ok() {
        tracing::error!(
            "Vault api error for {path}: {} {}",
            response.status,
            response.body
        );
    }
    response.error_for_status()
}

fn written_version(response: &VaultResponse) -> Option<SecretVersion> {
    if !response.is_ok() {
        return None;
    }
    serde_json::from_str::<KvWriteResponse>(&response.body)
        .ok()
        .map(|parsed| parsed.data.version)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
