use crate::cli::args::*;
use crate::cli::completions::handle_completion_command;
use crate::secrets::VaultSecretClient;
use crate::utils::errors::{Result, VaultKvError};
use crate::utils::output::OutputFormat;
use crate::vault::config::VaultConfig;
use crate::vault::kv::Secret;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

pub async fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "vault_kv=warn",  // Default: warnings only
            1 => "vault_kv=info",  // -v: info level
            2 => "vault_kv=debug", // -vv: debug level
            _ => "vault_kv=trace", // -vvv+: trace level
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    let output = OutputFormat::new(cli.raw);

    if let Commands::Completion { ref command } = cli.command {
        return handle_completion_command(command);
    }

    let config = load_config(cli.config.as_deref(), cli.vault_addr.as_deref())?;
    tracing::debug!("Using {config:?}");
    let client = VaultSecretClient::new(&config)?;

    match cli.command {
        Commands::Get { id, repo, json } => get_command(&client, &id, &repo, json, &output).await,
        Commands::Creds { id, repo } => creds_command(&client, &id, &repo, &output).await,
        Commands::List { repo, path } => {
            list_command(&client, &repo, path.as_deref(), &output).await
        }
        Commands::Update {
            id,
            repo,
            set,
            json_file,
            merge,
        } => {
            let data = match json_file {
                Some(file) => read_json_object(&file)?,
                None => parse_assignments(&set)?,
            };
            update_command(&client, &id, &repo, data, merge).await
        }
        Commands::Completion { .. } => Ok(()),
    }
}

fn load_config(explicit: Option<&Path>, vault_addr: Option<&str>) -> Result<VaultConfig> {
    let config = match explicit {
        Some(path) => VaultConfig::from_file(path)?,
        None => VaultConfig::load()?,
    };

    Ok(match vault_addr {
        Some(addr) if !addr.trim().is_empty() => {
            tracing::info!(
                "Overriding Vault address {} with {}",
                config.vault_address,
                addr.trim()
            );
            config.with_vault_address(addr.trim())
        }
        _ => config,
    })
}

async fn get_command(
    client: &VaultSecretClient,
    id: &str,
    repo: &str,
    json: bool,
    output: &OutputFormat,
) -> Result<()> {
    let secret = client.get_secret(id, repo).await?;

    if json {
        return output.print_json(&secret);
    }

    let mut pairs: Vec<(String, String)> = secret
        .iter()
        .map(|(k, v)| (k.clone(), display_value(v)))
        .collect();
    pairs.sort();
    output.print_key_value(&pairs);
    Ok(())
}

async fn creds_command(
    client: &VaultSecretClient,
    id: &str,
    repo: &str,
    output: &OutputFormat,
) -> Result<()> {
    match client.get_user_pwd(id, repo).await? {
        Some(pair) => {
            output.print_table(&[vec![pair.username, pair.password]]);
            Ok(())
        }
        None => {
            eprintln!("Secret {repo}/{id} has no username/password pair");
            std::process::exit(1);
        }
    }
}

async fn list_command(
    client: &VaultSecretClient,
    repo: &str,
    path: Option<&str>,
    output: &OutputFormat,
) -> Result<()> {
    let keys = match path {
        Some(folder) => client.list_secret_under(folder, repo).await?,
        None => client.list_secret(repo).await?,
    };
    output.print_list(&keys);
    Ok(())
}

async fn update_command(
    client: &VaultSecretClient,
    id: &str,
    repo: &str,
    data: Secret,
    merge: bool,
) -> Result<()> {
    let outcome = if merge {
        client.merge_secret(id, &data, repo).await?
    } else {
        client.upd_secret(id, &data, repo).await?
    };

    if !outcome.is_success() {
        return Err(VaultKvError::Api {
            status: outcome.status.as_u16(),
            body: outcome.body,
        });
    }

    match outcome.version {
        Some(version) => eprintln!("Updated {repo}/{id} (version {version})"),
        None => eprintln!("Updated {repo}/{id}"),
    }
    Ok(())
}

/// Parse `KEY=VALUE` arguments into secret data. Values are stored as strings.
pub fn parse_assignments(assignments: &[String]) -> Result<Secret> {
    if assignments.is_empty() {
        return Err(VaultKvError::InvalidInput(
            "Nothing to write: pass --set KEY=VALUE or --json-file".to_string(),
        ));
    }

    let mut data = Secret::new();
    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            VaultKvError::InvalidInput(format!("Expected KEY=VALUE, got '{assignment}'"))
        })?;
        if key.is_empty() {
            return Err(VaultKvError::InvalidInput(format!(
                "Empty key in '{assignment}'"
            )));
        }
        data.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(data)
}

/// Read secret data from a file holding a JSON object
pub fn read_json_object(path: &Path) -> Result<Secret> {
    let contents = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        _ => Err(VaultKvError::InvalidInput(format!(
            "{} does not hold a JSON object",
            path.display()
        ))),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
