use crate::secrets::DEFAULT_REPO;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vault-kv")]
#[command(version)]
#[command(about = "Read, list and update secrets in a Vault KV-v2 engine")]
#[command(long_about = None)]
pub struct Cli {
    /// Vault server URL (overrides vault_addr from the config file)
    #[arg(long, env = "VAULT_KV_ADDR")]
    pub vault_addr: Option<String>,

    /// Config file path (default: ~/.config/.vault/vault.yml, then /etc/vault/vault.yml)
    #[arg(long, env = "VAULT_KV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more verbosity: -v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output raw tab-separated values (no formatting)
    #[arg(short, long)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the key/value pairs of a secret
    Get {
        /// Secret path inside the mount
        id: String,
        /// KV-v2 mount
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
        /// Print the secret as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the username and password stored in a secret
    Creds {
        /// Secret path inside the mount
        id: String,
        /// KV-v2 mount
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
    },
    /// List secret keys in a mount
    List {
        /// KV-v2 mount
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
        /// Folder inside the mount
        #[arg(long)]
        path: Option<String>,
    },
    /// Replace a secret's data using check-and-set
    Update {
        /// Secret path inside the mount
        id: String,
        /// KV-v2 mount
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
        /// Key/value pair to store (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Read the new data from a JSON object file
        #[arg(long, conflicts_with = "set")]
        json_file: Option<PathBuf>,
        /// Keep existing keys that are not being set
        #[arg(long)]
        merge: bool,
    },
    /// Generate shell completion scripts
    Completion {
        #[command(subcommand)]
        command: CompletionCommands,
    },
}

#[derive(Subcommand)]
pub enum CompletionCommands {
    /// Generate bash completion script
    Bash,
    /// Generate zsh completion script
    Zsh,
    /// Generate fish completion script
    Fish,
    /// Generate PowerShell completion script
    PowerShell,
}

impl CompletionCommands {
    pub fn shell(&self) -> Shell {
        match self {
            CompletionCommands::Bash => Shell::Bash,
            CompletionCommands::Zsh => Shell::Zsh,
            CompletionCommands::Fish => Shell::Fish,
            CompletionCommands::PowerShell => Shell::PowerShell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let cli = Cli::try_parse_from([
            "vault-kv", "update", "apps/db", "--repo", "kv", "--set", "user=a", "--set", "pw=b",
        ])
        .unwrap();

        match cli.command {
            Commands::Update {
                id,
                repo,
                set,
                json_file,
                merge,
            } => {
                assert_eq!(id, "apps/db");
                assert_eq!(repo, "kv");
                assert_eq!(set, vec!["user=a", "pw=b"]);
                assert!(json_file.is_none());
                assert!(!merge);
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn test_default_repo() {
        let cli = Cli::try_parse_from(["vault-kv", "get", "test"]).unwrap();
        match cli.command {
            Commands::Get { id, repo, json } => {
                assert_eq!(id, "test");
                assert_eq!(repo, "secret");
                assert!(!json);
            }
            _ => panic!("expected get command"),
        }
    }

    #[test]
    fn test_vault_addr_env_is_crate_specific() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "vault_addr")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("VAULT_KV_ADDR")));
    }

    #[test]
    fn test_parse_update_merge() {
        let cli =
            Cli::try_parse_from(["vault-kv", "update", "db", "--set", "password=x", "--merge"])
                .unwrap();
        match cli.command {
            Commands::Update { set, merge, .. } => {
                assert_eq!(set, vec!["password=x"]);
                assert!(merge);
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn test_set_conflicts_with_json_file() {
        let result = Cli::try_parse_from([
            "vault-kv",
            "update",
            "test",
            "--set",
            "a=b",
            "--json-file",
            "data.json",
        ]);
        assert!(result.is_err());
    }
}
