use thiserror::Error;

use crate::domain::ValidationError;

/// Failures reported by the remote expense API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached the server. Worth retrying later.
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The server answered with an error status.
    #[error("Server rejected the request ({status}): {message}")]
    ServerRejected { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NetworkUnreachable,
    ServerRejected,
    StorageFailure,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Server rejected the expense ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Invalid offline queue document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            AppError::ServerRejected { .. } => ErrorKind::ServerRejected,
            AppError::Storage(_) | AppError::Serialization(_) => ErrorKind::StorageFailure,
        }
    }

    /// Only connectivity problems go away by trying again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::NetworkUnreachable
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NetworkUnreachable(msg) => AppError::NetworkUnreachable(msg),
            ApiError::ServerRejected { status, message } => {
                AppError::ServerRejected { status, message }
            }
        }
    }
}
