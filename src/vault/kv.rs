//! Request and response bodies of the KV-v2 secrets engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `data.data` payload of a KV-v2 secret
pub type Secret = Map<String, Value>;

/// Version number from `data.metadata.version`, used as the CAS token
pub type SecretVersion = u64;

/// Path of the versioned data endpoint: `{repo}/data/{id}`
pub fn data_path(repo: &str, id: &str) -> String {
    format!("{}/data/{}", repo, id.trim_start_matches('/'))
}

/// Path of the metadata endpoint, optionally below a folder
pub fn metadata_path(repo: &str, folder: Option<&str>) -> String {
    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{repo}/metadata/{folder}"),
        None => format!("{repo}/metadata"),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvReadResponse {
    pub data: KvReadData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvReadData {
    #[serde(default)]
    pub data: Option<Secret>,
    pub metadata: VersionMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionMetadata {
    pub version: SecretVersion,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub deletion_time: Option<String>,
    #[serde(default)]
    pub destroyed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvWriteResponse {
    pub data: VersionMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvListResponse {
    pub data: KvListData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvListData {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CasOptions {
    pub cas: SecretVersion,
}

/// Body of a check-and-set write: `{ options: { cas }, data }`
#[derive(Debug, Serialize)]
pub struct CasWriteRequest<'a, T: Serialize + ?Sized> {
    pub options: CasOptions,
    pub data: &'a T,
}

impl<'a, T: Serialize + ?Sized> CasWriteRequest<'a, T> {
    pub fn new(version: SecretVersion, data: &'a T) -> Self {
        Self {
            options: CasOptions { cas: version },
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        assert_eq!(data_path("secret", "test"), "secret/data/test");
        assert_eq!(data_path("kv", "/apps/db"), "kv/data/apps/db");
        assert_eq!(metadata_path("secret", None), "secret/metadata");
        assert_eq!(metadata_path("secret", Some("")), "secret/metadata");
        assert_eq!(metadata_path("secret", Some("/apps/")), "secret/metadata/apps");
    }

    #[test]
    fn test_read_response_parsing() {
        let body = json!({
            "request_id": "4d4b0d8e",
            "data": {
                "data": {"test": "test", "port": 5432},
                "metadata": {
                    "created_time": "2024-01-01T00:00:00.000000000Z",
                    "deletion_time": "",
                    "destroyed": false,
                    "version": 3
                }
            }
        });

        let response: KvReadResponse = serde_json::from_value(body).unwrap();
        let data = response.data.data.unwrap();
        assert_eq!(data.get("test"), Some(&json!("test")));
        assert_eq!(data.get("port"), Some(&json!(5432)));
        assert_eq!(response.data.metadata.version, 3);
        assert!(!response.data.metadata.destroyed);
    }

    #[test]
    fn test_read_response_with_null_data() {
        let body = json!({
            "data": {"data": null, "metadata": {"version": 2, "destroyed": true}}
        });
        let response: KvReadResponse = serde_json::from_value(body).unwrap();
        assert!(response.data.data.is_none());
        assert!(response.data.metadata.destroyed);
    }

    #[test]
    fn test_cas_write_body() {
        let data = json!({"username": "admin", "password": "hunter2"});
        let body = serde_json::to_value(CasWriteRequest::new(7, &data)).unwrap();
        assert_eq!(
            body,
            json!({
                "options": {"cas": 7},
                "data": {"username": "admin", "password": "hunter2"}
            })
        );
    }
}
