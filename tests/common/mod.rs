// tests/common/mod.rs

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use vault_kv::{ListMethod, VaultClient, VaultConfig, VaultSecretClient};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Client pointed at a mock server over plain HTTP
pub fn secret_client(mock_uri: &str) -> VaultSecretClient {
    secret_client_with(mock_uri, ListMethod::Verb)
}

pub fn secret_client_with(mock_uri: &str, list_method: ListMethod) -> VaultSecretClient {
    let config = VaultConfig::new(mock_uri, "/unused/bundle.pem", TOKEN).with_list_method(list_method);
    VaultSecretClient::with_client(VaultClient::with_http_client(&config, reqwest::Client::new()))
}

/// Helper to create a Vault KV2 read response in the expected format.
pub fn vault_kv2_response(data: Value, version: u64) -> Value {
    json!({
        "request_id": "test-request-id",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": data,
            "metadata": {
                "created_time": "2024-01-01T00:00:00.000000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": version
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

pub fn vault_list_response(keys: &[&str]) -> Value {
    json!({
        "request_id": "test-request-id",
        "data": { "keys": keys }
    })
}

/// In-memory KV-v2 mount enforcing check-and-set like a real server
#[derive(Clone, Default)]
pub struct FakeKv {
    secrets: Arc<Mutex<BTreeMap<String, (u64, Value)>>>,
}

impl FakeKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, id: &str, data: Value) {
        let mut secrets = self.secrets.lock().unwrap();
        let version = secrets.get(id).map(|(v, _)| v + 1).unwrap_or(1);
        secrets.insert(id.to_string(), (version, data));
    }

    pub fn stored(&self, id: &str) -> Option<(u64, Value)> {
        self.secrets.lock().unwrap().get(id).cloned()
    }

    /// Serve `/v1/{mount}/...` from this store
    pub async fn mount_on(&self, server: &MockServer, mount: &str) {
        Mock::given(path_regex(format!("^/v1/{mount}/(data|metadata)")))
            .respond_with(FakeKvResponder {
                store: self.clone(),
                mount: mount.to_string(),
            })
            .mount(server)
            .await;
    }

    fn read(&self, id: &str) -> ResponseTemplate {
        match self.stored(id) {
            Some((version, data)) => {
                ResponseTemplate::new(200).set_body_json(vault_kv2_response(data, version))
            }
            None => ResponseTemplate::new(404).set_body_json(json!({"errors": []})),
        }
    }

    fn write(&self, id: &str, body: &[u8]) -> ResponseTemplate {
        let Ok(request) = serde_json::from_slice::<Value>(body) else {
            return ResponseTemplate::new(400).set_body_json(json!({"errors": ["bad body"]}));
        };
        let Some(data) = request.get("data").cloned() else {
            return ResponseTemplate::new(400)
                .set_body_json(json!({"errors": ["no data provided"]}));
        };
        let cas = request
            .get("options")
            .and_then(|o| o.get("cas"))
            .and_then(Value::as_u64);

        let mut secrets = self.secrets.lock().unwrap();
        let current = secrets.get(id).map(|(v, _)| *v).unwrap_or(0);
        if let Some(expected) = cas {
            if expected != current {
                return ResponseTemplate::new(400).set_body_json(json!({
                    "errors": ["check-and-set parameter did not match the current version"]
                }));
            }
        }

        let version = current + 1;
        secrets.insert(id.to_string(), (version, data));
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "created_time": "2024-01-01T00:00:00.000000000Z",
                "deletion_time": "",
                "destroyed": false,
                "version": version
            }
        }))
    }

    fn list(&self, folder: &str) -> ResponseTemplate {
        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{}/", folder.trim_matches('/'))
        };

        let secrets = self.secrets.lock().unwrap();
        let mut keys: Vec<String> = Vec::new();
        for id in secrets.keys() {
            let Some(rest) = id.strip_prefix(&prefix) else {
                continue;
            };
            let key = match rest.split_once('/') {
                Some((dir, _)) => format!("{dir}/"),
                None => rest.to_string(),
            };
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return ResponseTemplate::new(404).set_body_json(json!({"errors": []}));
        }
        ResponseTemplate::new(200).set_body_json(json!({"data": {"keys": keys}}))
    }
}

struct FakeKvResponder {
    store: FakeKv,
    mount: String,
}

impl Respond for FakeKvResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let token = request
            .headers
            .get("X-Vault-Token")
            .and_then(|v| v.to_str().ok());
        if token != Some(TOKEN) {
            return ResponseTemplate::new(403)
                .set_body_json(json!({"errors": ["permission denied"]}));
        }

        let path = request.url.path();
        let is_list = request.method.as_str() == "LIST"
            || request.url.query_pairs().any(|(k, v)| k == "list" && v == "true");

        let data_prefix = format!("/v1/{}/data/", self.mount);
        let metadata_root = format!("/v1/{}/metadata", self.mount);

        if let Some(id) = path.strip_prefix(&data_prefix) {
            return match request.method.as_str() {
                "GET" => self.store.read(id),
                "POST" | "PUT" => self.store.write(id, &request.body),
                _ => ResponseTemplate::new(405),
            };
        }

        if is_list {
            if let Some(folder) = path.strip_prefix(&metadata_root) {
                return self.store.list(folder.trim_start_matches('/'));
            }
        }

        ResponseTemplate::new(404).set_body_json(json!({"errors": []}))
    }
}
