use searchfill_core::FillError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid header {0}: {1}")]
    InvalidHeader(String, String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

impl From<RemoteError> for FillError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Parse(message) => FillError::Parse(message),
            RemoteError::ApiError(url, message) => FillError::Transport { url, message },
            RemoteError::Http(e) => FillError::Transport {
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
                message: e.to_string(),
            },
            RemoteError::InvalidHeader(name, message) => {
                FillError::InvalidConfig(format!("header {name}: {message}"))
            }
        }
    }
}
