//! Prometheus metrics for the feed service

use actix_web::{HttpResponse, Responder};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Encoder, Histogram,
    HistogramVec, IntCounterVec, TextEncoder,
};
use std::time::Duration;

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests by method, path and status",
        &["method", "path", "status"]
    )
    .expect("Failed to register http requests metric")
});

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latency by method and path",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register http duration metric")
});

static FEED_PAGE_SIZE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "feed_page_size",
        "Posts returned per ranked feed page",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]
    )
    .expect("Failed to register feed page size metric")
});

/// Record one completed HTTP request
pub fn observe_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record the size of a served feed page
pub fn record_feed_page(posts: usize) {
    FEED_PAGE_SIZE.observe(posts as f64);
}

/// Handler that serialises Prometheus metrics in text format
pub async fn serve_metrics() -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
