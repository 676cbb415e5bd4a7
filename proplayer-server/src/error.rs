use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proplayer_core::error::ProplayerError;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of one HTTP request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Proplayer(#[from] ProplayerError),
    #[error("Unsupported Method")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Proplayer(err) => match err {
                ProplayerError::Auth(_) => StatusCode::UNAUTHORIZED,
                ProplayerError::Path(_) | ProplayerError::Query(_) => StatusCode::BAD_REQUEST,
                ProplayerError::NotFound { .. } => StatusCode::NOT_FOUND,
                ProplayerError::Encoding(_) | ProplayerError::Backend(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let msg = self.to_string();

        if status.is_server_error() {
            error!(error = %msg, "request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(error = %msg, "unauthorized request");
        }

        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
