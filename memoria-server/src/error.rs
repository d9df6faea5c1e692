use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use memoria_core::MemoriaError;
use serde_json::json;

pub const UNHANDLED_MESSAGE: &str = "An unhandled exception occurred.";
pub const VALIDATION_MESSAGE: &str = "Input payload validation failed";

/// What the client was trying to do when a fact lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactAction {
    Get,
    Update,
    Delete,
}

impl FactAction {
    fn suffix(self) -> &'static str {
        match self {
            FactAction::Get => "",
            FactAction::Update => " Unable to update fact.",
            FactAction::Delete => " Unable to delete fact.",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("The fact '{uuid}' could not be found.{}", .action.suffix())]
    NotFound { uuid: String, action: FactAction },

    #[error("Input payload validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("The requested URL was not found on the server.")]
    NoRoute,

    #[error("An unhandled exception occurred: {0}")]
    Internal(#[from] MemoriaError),
}

impl ApiError {
    /// Map a persistence failure for the fact `uuid`. Only `NotFound` is
    /// client-visible; everything else is unhandled.
    pub fn from_fact_error(err: MemoriaError, uuid: &str, action: FactAction) -> Self {
        match err {
            MemoriaError::NotFound(_) => ApiError::NotFound {
                uuid: uuid.to_string(),
                action,
            },
            other => ApiError::Internal(other),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client. Internal details never appear here.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::NotFound { .. } | ApiError::NoRoute => json!({ "message": self.to_string() }),
            ApiError::Validation { field, reason } => {
                let mut errors = serde_json::Map::new();
                errors.insert(field.clone(), json!(reason));
                json!({ "message": VALIDATION_MESSAGE, "errors": errors })
            }
            ApiError::Internal(_) => json!({ "message": UNHANDLED_MESSAGE }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(source) => {
                tracing::error!(error = ?source, "{}", UNHANDLED_MESSAGE);
            }
            ApiError::NotFound { uuid, action } => {
                tracing::warn!(uuid = %uuid, action = ?action, "Fact not found");
            }
            ApiError::Validation { field, reason } => {
                tracing::debug!(field = %field, reason = %reason, "Rejected request");
            }
            ApiError::NoRoute => {}
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Turn a handler panic into the generic 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(MemoriaError::Other(format!("handler panicked: {}", detail))).into_response()
}
