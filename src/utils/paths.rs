use crate::utils::errors::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub struct VaultKvPaths;

/// Config file location relative to the user's home directory
const USER_CONFIG_FILE: &str = ".config/.vault/vault.yml";
const SYSTEM_DIR: &str = "/etc/vault";
const SYSTEM_CONFIG_NAME: &str = "vault.yml";
const SYSTEM_BUNDLE_NAME: &str = "bundle.pem";

impl VaultKvPaths {
    /// Get the user's home directory, if one can be determined
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir()
    }

    /// Get the user config file: ~/.config/.vault/vault.yml
    pub fn user_config_file(home: &Path) -> PathBuf {
        home.join(USER_CONFIG_FILE)
    }

    /// Get the system-wide config directory: /etc/vault
    pub fn system_dir() -> PathBuf {
        PathBuf::from(SYSTEM_DIR)
    }

    /// Get the system-wide config file inside `system_dir`
    pub fn system_config_file(system_dir: &Path) -> PathBuf {
        system_dir.join(SYSTEM_CONFIG_NAME)
    }

    /// Get the fixed CA bundle used with the system-wide config
    pub fn system_bundle_file(system_dir: &Path) -> PathBuf {
        system_dir.join(SYSTEM_BUNDLE_NAME)
    }

    /// Resolve a configured path against `base`, stripping a leading `~/`.
    /// Absolute paths are returned unchanged.
    pub fn expand_home_relative(base: &Path, configured: &str) -> PathBuf {
        let relative = configured.strip_prefix("~/").unwrap_or(configured);
        base.join(relative)
    }

    /// Resolve a path configured in a file at `dir`: `~/` joins onto `home`
    /// (or `dir` when home is unknown), other relative paths onto `dir`
    pub fn expand_file_relative(home: Option<&Path>, dir: &Path, configured: &str) -> PathBuf {
        match configured.strip_prefix("~/") {
            Some(relative) => home.unwrap_or(dir).join(relative),
            None => dir.join(configured),
        }
    }

    /// Ensure a directory exists
    pub fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }
}
