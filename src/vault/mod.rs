pub mod client;
pub mod config;
pub mod kv;

use crate::utils::errors::{Result, VaultKvError};
use reqwest::{Certificate, Client};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Create an HTTP client that trusts only the CA certificates in `bundle_path`.
/// Built-in and system roots are never consulted.
pub fn create_http_client(bundle_path: &Path, timeout: Duration) -> Result<Client> {
    let bundle = fs::read(bundle_path).map_err(|e| {
        VaultKvError::Config(format!(
            "Cannot read CA bundle {}: {e}",
            bundle_path.display()
        ))
    })?;

    let certificates = Certificate::from_pem_bundle(&bundle).map_err(|e| {
        VaultKvError::Config(format!(
            "Invalid CA bundle {}: {e}",
            bundle_path.display()
        ))
    })?;
    if certificates.is_empty() {
        return Err(VaultKvError::Config(format!(
            "CA bundle {} contains no certificates",
            bundle_path.display()
        )));
    }
    tracing::debug!(
        "Pinning TLS to {} CA certificate(s) from {}",
        certificates.len(),
        bundle_path.display()
    );

    let builder = certificates
        .into_iter()
        .fold(Client::builder(), |builder, cert| {
            builder.add_root_certificate(cert)
        });

    builder
        .tls_built_in_root_certs(false)
        .use_rustls_tls()
        .timeout(timeout)
        .build()
        .map_err(VaultKvError::from)
}
