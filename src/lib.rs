pub mod cli;
pub mod secrets;
pub mod utils;
pub mod vault;

pub use secrets::{
    CredentialPair, LegacySecrets, VaultSecretClient, VersionedSecret, WriteOutcome, DEFAULT_REPO,
};
pub use utils::errors::{Result, VaultKvError};
pub use vault::client::{ListMethod, VaultClient};
pub use vault::config::{ConfigSource, VaultConfig};
pub use vault::kv::{Secret, SecretVersion};
