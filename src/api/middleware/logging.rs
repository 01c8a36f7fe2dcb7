use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Keys whose values never reach the logs
const MASKED_KEYS: [&str; 4] = ["api_key", "token", "password", "secret"];

/// Log every request and its outcome with structured fields
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = %sanitize_query(&query),
        user_agent = %user_agent,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let kind = if status.is_client_error() {
            "client error"
        } else {
            "server error"
        };
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed ({})",
            kind
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Mask the values of credential-like query keys.
///
/// Works pair by pair on percent-decoded keys, so `token[eq]`, `%74oken` and
/// repeated keys are all masked.
fn sanitize_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            let decoded = urlencoding::decode(&key.replace('+', " "))
                .map(|k| k.into_owned())
                .unwrap_or_else(|_| key.to_string());
            let base = decoded.split('[').next().unwrap_or(&decoded).to_lowercase();
            match value {
                Some(_) if MASKED_KEYS.contains(&base.as_str()) => format!("{}=***", key),
                _ => pair.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
