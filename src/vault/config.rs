use crate::utils::errors::{Result, VaultKvError};
use crate::utils::paths::VaultKvPaths;
use crate::vault::client::ListMethod;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    vault: VaultSection,
}

#[derive(Debug, Deserialize)]
struct VaultSection {
    vault_addr: String,
    #[serde(default)]
    certs: Option<String>,
    token: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    list_method: ListMethod,
}

/// How the `certs` setting becomes the CA bundle path
enum BundleLocation<'a> {
    /// `~/` stripped, joined onto the home directory
    HomeRelative(&'a Path),
    /// `~/` joins onto home, anything else onto the config file's directory
    FileRelative { home: Option<&'a Path>, dir: &'a Path },
    /// `certs` is ignored
    Pinned(PathBuf),
}

/// Where a configuration was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// ~/.config/.vault/vault.yml
    User(PathBuf),
    /// /etc/vault/vault.yml, with the bundle pinned to /etc/vault/bundle.pem
    System(PathBuf),
    /// A file named on the command line
    Explicit(PathBuf),
    /// Built in code with `VaultConfig::new`
    Inline,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::User(p) | ConfigSource::System(p) | ConfigSource::Explicit(p) => {
                Some(p)
            }
            ConfigSource::Inline => None,
        }
    }
}

/// Connection settings for one Vault server. Immutable once loaded.
#[derive(Clone)]
pub struct VaultConfig {
    pub vault_address: String,
    pub certificate_bundle_path: PathBuf,
    pub token: String,
    pub timeout: Duration,
    pub list_method: ListMethod,
    pub source: ConfigSource,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("vault_address", &self.vault_address)
            .field("certificate_bundle_path", &self.certificate_bundle_path)
            .field("token", &mask_token(&self.token))
            .field("timeout", &self.timeout)
            .field("list_method", &self.list_method)
            .field("source", &self.source)
            .finish()
    }
}

impl VaultConfig {
    /// Build a configuration in code, with default timeout and list method
    pub fn new(
        vault_address: &str,
        certificate_bundle_path: impl Into<PathBuf>,
        token: &str,
    ) -> Self {
        Self {
            vault_address: vault_address.trim_end_matches('/').to_string(),
            certificate_bundle_path: certificate_bundle_path.into(),
            token: token.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            list_method: ListMethod::default(),
            source: ConfigSource::Inline,
        }
    }

    pub fn with_list_method(mut self, list_method: ListMethod) -> Self {
        self.list_method = list_method;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from the user location, falling back to /etc/vault
    pub fn load() -> Result<Self> {
        let home = VaultKvPaths::home_dir();
        Self::resolve(home.as_deref(), &VaultKvPaths::system_dir())
    }

    /// Resolve the configuration from a home directory (if known) and a
    /// system directory. The user file wins when it exists and parses.
    pub fn resolve(home: Option<&Path>, system_dir: &Path) -> Result<Self> {
        if let Some(home) = home {
            let user_file = VaultKvPaths::user_config_file(home);
            match fs::read_to_string(&user_file) {
                Ok(contents) => {
                    let source = ConfigSource::User(user_file.clone());
                    match Self::parse(&contents, BundleLocation::HomeRelative(home), source) {
                        Ok(config) => {
                            tracing::debug!("Loaded Vault config from {}", user_file.display());
                            return Ok(config);
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Ignoring unusable config {}: {e}",
                                user_file.display()
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("No user config at {}: {e}", user_file.display());
                }
            }
        } else {
            tracing::debug!("Home directory unknown, skipping user config");
        }

        Self::load_system(system_dir)
    }

    /// Load an explicitly named file
    pub fn from_file(path: &Path) -> Result<Self> {
        let home = VaultKvPaths::home_dir();
        Self::from_file_in(path, home.as_deref(), &VaultKvPaths::system_dir())
    }

    /// Load an explicitly named file. A relative `certs` resolves against the
    /// file's own directory, a `~/` one against home. Naming the system file
    /// keeps its pinned bundle.
    pub fn from_file_in(path: &Path, home: Option<&Path>, system_dir: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            VaultKvError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        let source = ConfigSource::Explicit(path.to_path_buf());

        if path == VaultKvPaths::system_config_file(system_dir).as_path() {
            let bundle = VaultKvPaths::system_bundle_file(system_dir);
            return Self::parse(&contents, BundleLocation::Pinned(bundle), source);
        }

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&contents, BundleLocation::FileRelative { home, dir }, source)
    }

    /// Replace the server address, e.g. from `--vault-addr`
    pub fn with_vault_address(mut self, vault_address: &str) -> Self {
        self.vault_address = vault_address.trim_end_matches('/').to_string();
        self
    }

    fn load_system(system_dir: &Path) -> Result<Self> {
        if let Err(e) = VaultKvPaths::ensure_dir_exists(system_dir) {
            tracing::warn!("Cannot create {}: {e}", system_dir.display());
        }

        let system_file = VaultKvPaths::system_config_file(system_dir);
        let contents = fs::read_to_string(&system_file).map_err(|e| {
            tracing::error!("No vault configuration found in {}", system_dir.display());
            VaultKvError::Config(format!(
                "No vault configuration found ({}: {e})",
                system_file.display()
            ))
        })?;

        let bundle = VaultKvPaths::system_bundle_file(system_dir);
        let config = Self::parse(
            &contents,
            BundleLocation::Pinned(bundle),
            ConfigSource::System(system_file.clone()),
        )?;
        tracing::debug!("Loaded Vault config from {}", system_file.display());
        Ok(config)
    }

    fn parse(contents: &str, bundle: BundleLocation<'_>, source: ConfigSource) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)
            .map_err(|e| VaultKvError::Config(format!("Invalid configuration: {e}")))?;
        let section = file.vault;

        let vault_address = section.vault_addr.trim().trim_end_matches('/').to_string();
        if vault_address.is_empty() {
            return Err(VaultKvError::Config("vault.vault_addr is empty".to_string()));
        }

        let token = section.token.trim().to_string();
        if token.is_empty() {
            return Err(VaultKvError::Config("vault.token is empty".to_string()));
        }

        // The system location always uses its own bundle, whatever `certs` says
        let certs = || {
            section
                .certs
                .as_deref()
                .ok_or_else(|| VaultKvError::Config("vault.certs is missing".to_string()))
        };
        let certificate_bundle_path = match bundle {
            BundleLocation::Pinned(path) => path,
            BundleLocation::HomeRelative(home) => VaultKvPaths::expand_home_relative(home, certs()?),
            BundleLocation::FileRelative { home, dir } => {
                VaultKvPaths::expand_file_relative(home, dir, certs()?)
            }
        };

        let timeout = Duration::from_secs(
            section
                .timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(Self {
            vault_address,
            certificate_bundle_path,
            token,
            timeout,
            list_method: section.list_method,
            source,
        })
    }
}

/// Tokens at most this long are masked entirely
const FULLY_MASKED_MAX_LEN: usize = 8;

/// Show only the first few characters of a long token
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= FULLY_MASKED_MAX_LEN {
        return "***".to_string();
    }
    let visible: String = token.chars().take(4).collect();
    format!("{visible}***")
}
