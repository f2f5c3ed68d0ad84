pub mod legacy;
pub mod service;

pub use legacy::LegacySecrets;
pub use service::{CredentialPair, VaultSecretClient, VersionedSecret, WriteOutcome, DEFAULT_REPO};
