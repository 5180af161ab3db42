//! JSON bodies shared by every entity API.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned by a handler: status code plus JSON error body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Result returned by every entity handler.
pub type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

/// JSON body for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short description of what failed
    pub error: String,
    /// Underlying cause, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl ToString) -> Self {
        Self {
            error: error.into(),
            details: Some(details.to_string()),
        }
    }

    /// Pairs the body with a status code, ready to be returned as `Err`.
    pub fn with_status(self, status: StatusCode) -> ApiError {
        (status, Json(self))
    }
}

/// JSON body confirming a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
