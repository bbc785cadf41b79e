use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Order processing times cluster well under a second; the tail buckets exist
/// so a regression to multi-second processing is still visible.
const PROCESSING_TIME_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 10.0];

/// Prometheus metrics for the sample application, held in an explicit
/// registry so the whole set can be injected through `AppState` and rendered
/// from the `/metrics` route.
#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    requests: IntCounterVec,
    request_duration: HistogramVec,
    orders: IntCounter,
    processing_time: Histogram,
    errors: IntCounterVec,
    active_users: IntGauge,
}

impl AppMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("sample_app_requests_total", "Total number of requests"),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "sample_app_request_duration_seconds",
                "Request duration in seconds",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let orders = IntCounter::new("sample_app_orders_total", "Total number of orders")?;
        registry.register(Box::new(orders.clone()))?;

        let processing_time = Histogram::with_opts(
            HistogramOpts::new(
                "sample_app_processing_time_seconds",
                "Order processing time in seconds",
            )
            .buckets(PROCESSING_TIME_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(processing_time.clone()))?;

        let errors = IntCounterVec::new(
            Opts::new("sample_app_errors_total", "Total number of errors"),
            &["error_type"],
        )?;
        registry.register(Box::new(errors.clone()))?;

        let active_users = IntGauge::new("sample_app_active_users", "Number of active users")?;
        registry.register(Box::new(active_users.clone()))?;

        Ok(Self {
            registry,
            requests,
            request_duration,
            orders,
            processing_time,
            errors,
            active_users,
        })
    }

    pub fn record_request(&self, method: &str, endpoint: &str) {
        self.requests.with_label_values(&[method, endpoint]).inc();
    }

    pub fn observe_request_duration(&self, endpoint: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn record_order(&self, processing_seconds: f64) {
        self.orders.inc();
        self.processing_time.observe(processing_seconds);
    }

    pub fn record_error(&self, error_type: &str) {
        self.errors.with_label_values(&[error_type]).inc();
    }

    pub fn set_active_users(&self, count: u32) {
        self.active_users.set(i64::from(count));
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
