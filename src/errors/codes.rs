use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Error codes for structured API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Query-string input rejected (e.g. non-numeric filter operator value)
    ValidationError,

    /// No resource registered under the requested name
    ResourceNotFound,

    /// The model handle failed to answer
    ModelError,

    /// Internal server error
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
            Self::ResourceNotFound => write!(f, "RESOURCE_NOT_FOUND"),
            Self::ModelError => write!(f, "MODEL_ERROR"),
            Self::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

impl ErrorCode {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::ResourceNotFound => 404,
            Self::ModelError => 503,
            Self::InternalError => 500,
        }
    }
}
