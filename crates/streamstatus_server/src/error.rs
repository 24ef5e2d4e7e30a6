//! Error types for the webhook server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use streamstatus_core::CoreError;
use streamstatus_protocol::ProtocolError;
use streamstatus_repo::RepoError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the webhook server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Startup configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The delivery is not authentically from the provider.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The verified body could not be decoded.
    #[error("decode error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The status document could not be updated.
    #[error("status error: {0}")]
    Core(#[from] CoreError),

    /// Clone, pull, read, write, commit or push failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepoError),

    /// The sync queue is full.
    #[error("sync queue is full")]
    QueueFull,

    /// The dispatcher no longer accepts work.
    #[error("server is shutting down")]
    ShuttingDown,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::AuthenticationFailed(_)
                | ServerError::Protocol(_)
                | ServerError::Core(CoreError::EmptyEntity)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::AuthenticationFailed(_) => StatusCode::FORBIDDEN,
            ServerError::QueueFull | ServerError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors answer with a bare status: rejected deliveries get no body.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = %self, "webhook request failed");
        }
        self.status_code().into_response()
    }
}
