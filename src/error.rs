use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Closed classification of failures, exposed to clients so they can branch
/// on the kind of failure instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad credentials or missing/expired session
    Authentication,
    /// Authenticated, but not allowed to perform the action
    Authorization,
    /// The addressed record does not exist
    NotFound,
    /// Network or remote-service failure
    Remote,
    /// Rejected input
    Validation,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Authentication(_) => ErrorKind::Authentication,
            AppError::Forbidden(_) => ErrorKind::Authorization,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidInput(_) | AppError::Conflict(_) => ErrorKind::Validation,
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::HttpClient(_)
            | AppError::ExternalApi(_) => ErrorKind::Remote,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether repeating the same call could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Remote
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            // Backend details stay in the log
            AppError::Database(_) => {
                tracing::error!(error = %self, "Storage backend failed");
                (StatusCode::BAD_GATEWAY, "Storage backend unavailable".to_string())
            }
            AppError::Cache(_) => {
                tracing::error!(error = %self, "Cache backend failed");
                (StatusCode::BAD_GATEWAY, "Cache backend unavailable".to_string())
            }
            AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
