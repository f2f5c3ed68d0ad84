use crate::utils::errors::{Result, VaultKvError};
use crate::vault::config::{mask_token, VaultConfig};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a LIST request is put on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMethod {
    /// The Vault-specific `LIST` HTTP verb
    #[default]
    Verb,
    /// `GET ...?list=true`, for proxies that drop unknown verbs
    #[serde(rename = "query")]
    QueryFlag,
}

/// Status and raw body of a Vault reply
#[derive(Debug, Clone)]
pub struct VaultResponse {
    pub status: StatusCode,
    pub body: String,
}

impl VaultResponse {
    /// Vault answers 200 for every successful KV-v2 read, list and write
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-200 reply into `VaultKvError::Api`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(VaultKvError::Api {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }
}

pub struct VaultClient {
    client: Client,
    vault_addr: String,
    token: String,
    list_method: ListMethod,
}

impl VaultClient {
    /// Build a client whose TLS trust is pinned to the configured CA bundle
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let client = super::create_http_client(&config.certificate_bundle_path, config.timeout)?;
        Ok(Self::with_http_client(config, client))
    }

    /// Use a caller-supplied HTTP client instead of building one
    pub fn with_http_client(config: &VaultConfig, client: Client) -> Self {
        Self {
            client,
            vault_addr: config.vault_address.clone(),
            token: config.token.clone(),
            list_method: config.list_method,
        }
    }

    /// Get vault address
    pub fn vault_addr(&self) -> &str {
        &self.vault_addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.vault_addr, path.trim_start_matches('/'))
    }

    /// Generic GET request to Vault API
    pub async fn get(&self, path: &str) -> Result<VaultResponse> {
        let request = self.client.get(self.url(path));
        self.execute(request).await
    }

    /// Generic POST request to Vault API
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<VaultResponse> {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(request).await
    }

    /// LIST request, sent as the configured `ListMethod`
    pub async fn list(&self, path: &str) -> Result<VaultResponse> {
        let url = self.url(path);
        let request = match self.list_method {
            ListMethod::Verb => {
                let verb = Method::from_bytes(b"LIST").map_err(|e| {
                    VaultKvError::InvalidInput(format!("Invalid HTTP method: {e}"))
                })?;
                self.client.request(verb, url)
            }
            ListMethod::QueryFlag => self.client.get(url).query(&[("list", "true")]),
        };
        self.execute(request).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<VaultResponse> {
        let request = request.header("X-Vault-Token", &self.token).build()?;
        tracing::debug!(
            "Vault {} {} (token {})",
            request.method(),
            request.url(),
            mask_token(&self.token)
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::trace!("Vault response {status}: {} bytes", body.len());

        Ok(VaultResponse { status, body })
    }
}
