use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultKvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vault transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Vault API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed Vault response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VaultKvError {
    /// HTTP status of a Vault API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            VaultKvError::Api { status, .. } => Some(*status),
            VaultKvError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Vault answers 403 both for a bad token and for a missing policy
    pub fn is_denied(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, VaultKvError::Transport(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, VaultKvError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, VaultKvError>;
