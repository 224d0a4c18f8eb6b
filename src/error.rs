use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("token not provided")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    /// Store or hashing failure. Only `context` reaches the client.
    #[error("{context}")]
    Internal {
        context: &'static str,
        source: anyhow::Error,
    },
}

impl ApiError {
    /// `map_err` adapter that tags an internal failure with a client-safe message.
    pub fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
        move |source| ApiError::Internal { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { context, source } = &self {
            error!(error = ?source, "{context}");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
