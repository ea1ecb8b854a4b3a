use thiserror::Error;

/// Errors from the remote sheet service or the credential store.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} - {reason}")]
    Status { status: u16, reason: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to parse response JSON: {0}")]
    Json(String),

    #[error("Credential file error: {0}")]
    Credential(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
