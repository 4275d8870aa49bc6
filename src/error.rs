use thiserror::Error;

pub type OnboardResult<T> = Result<T, OnboardError>;

#[derive(Error, Debug)]
pub enum OnboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote call to {route} failed with status {status}: {body}")]
    Remote {
        route: String,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response from {route}: {message}")]
    Response { route: String, message: String },

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl OnboardError {
    /// Short kind label used in run logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            OnboardError::Io(_) => "io",
            OnboardError::Yaml(_) | OnboardError::Config(_) => "config",
            OnboardError::Json(_) | OnboardError::Response { .. } => "response",
            OnboardError::Extraction(_) => "extraction",
            OnboardError::Validation(_) => "validation",
            OnboardError::Remote { .. } | OnboardError::Transport(_) => "remote",
            OnboardError::Signing(_) => "signing",
            OnboardError::Template(_) => "template",
            OnboardError::Migration(_) => "migration",
        }
    }
}
