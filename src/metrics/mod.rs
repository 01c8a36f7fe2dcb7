pub mod middleware;
pub mod registry;

pub use registry::{
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, MODEL_CALLS_TOTAL,
    MODEL_CALL_DURATION_SECONDS, QUERY_VALIDATION_ERRORS_TOTAL, RECORDS_LOADED,
    RESOURCES_REGISTERED,
};

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::ErrorResponse;

/// Prometheus text exposition of the default registry, served at `/metrics`
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(body) => ([(header::CONTENT_TYPE, encoder.format_type())], body).into_response(),
        Err(e) => {
            tracing::error!("Metrics exposition failed: {}", e);
            ErrorResponse::internal_error(format!("Metrics exposition failed: {}", e))
                .into_response()
        }
    }
}
