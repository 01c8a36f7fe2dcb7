use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Model Metrics
    pub static ref MODEL_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "model_calls_total",
        "Total calls to model handles",
        &["resource", "operation"]  // operation: find_many, count
    )
    .unwrap();

    pub static ref MODEL_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "model_call_duration_seconds",
        "Model call duration in seconds",
        &["resource", "operation"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // Query Metrics
    pub static ref QUERY_VALIDATION_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "query_validation_errors_total",
        "Requests rejected for invalid filter values",
        &["resource"]
    )
    .unwrap();

    // Dataset Metrics
    pub static ref RESOURCES_REGISTERED: IntGauge = register_int_gauge!(
        "resources_registered",
        "Number of resources served"
    )
    .unwrap();

    pub static ref RECORDS_LOADED: IntGaugeVec = register_int_gauge_vec!(
        "records_loaded",
        "Records loaded per resource",
        &["resource"]
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&MODEL_CALLS_TOTAL);
    lazy_static::initialize(&MODEL_CALL_DURATION_SECONDS);
    lazy_static::initialize(&QUERY_VALIDATION_ERRORS_TOTAL);
    lazy_static::initialize(&RESOURCES_REGISTERED);
    lazy_static::initialize(&RECORDS_LOADED);
}
