use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::codes::ErrorCode;
use crate::query::QueryError;

/// Structured error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Request ID for tracing
    pub request_id: String,
    /// Additional context (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                request_id: Uuid::new_v4().to_string(),
                details: None,
            },
        }
    }

    /// Create error with additional details
    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        let mut response = Self::new(code, message);
        response.error.details = Some(details);
        response
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.code.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Helper for creating common errors
impl ErrorResponse {
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn model_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<QueryError> for ErrorResponse {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::InvalidFilterValue { operator } => Self::with_details(
                ErrorCode::ValidationError,
                err.to_string(),
                json!({ "operator": operator }),
            ),
            QueryError::Model(_) => Self::model_error(err.to_string()),
        }
    }
}
