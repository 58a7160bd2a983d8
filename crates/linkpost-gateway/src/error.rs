//! Error → HTTP response mapping. Every failure body is `{success:false, error}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linkpost_core::error::LinkPostError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Status for a domain error, looking through cycle wrappers.
pub fn status_for(err: &LinkPostError) -> StatusCode {
    match err.root_cause() {
        LinkPostError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LinkPostError::Auth(_) => StatusCode::UNAUTHORIZED,
        LinkPostError::StateMismatch => StatusCode::FORBIDDEN,
        LinkPostError::Publish(_)
        | LinkPostError::Provider(_)
        | LinkPostError::ApiKeyMissing(_)
        | LinkPostError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<LinkPostError> for ApiError {
    fn from(err: LinkPostError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("❌ {} {}", self.status.as_u16(), self.message);
        } else {
            tracing::warn!("⚠️ {} {}", self.status.as_u16(), self.message);
        }
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}
