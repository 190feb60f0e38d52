use thiserror::Error;

/// All errors that can occur in searchfill-core.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Invalid field config: {0}")]
    InvalidConfig(String),

    #[error("Value field not found: {0}")]
    MissingValueField(String),

    #[error("Transport error from {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FillError>;
