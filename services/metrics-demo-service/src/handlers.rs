use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use tracing::error;

use crate::app::AppState;
use crate::cloud::MetricDatum;

/// Root endpoint with API documentation
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Sample Application with Custom Metrics",
        "version": "1.0.0",
        "endpoints": {
            "/metrics": "Prometheus metrics endpoint",
            "/order": "Create an order (POST)",
            "/users": "Get/Update active users (GET/POST)",
            "/health": "Health check",
            "/error": "Generate test error (for alerting)"
        }
    }))
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(?err, "Failed to render metrics snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

struct ProcessedOrder {
    processing_time: f64,
    order_id: String,
}

async fn process_order(state: &AppState) -> anyhow::Result<ProcessedOrder> {
    // Simulated processing delay, a demonstration hook rather than real work.
    let processing_delay = rand::thread_rng().gen_range(0.1..=0.5);
    tokio::time::sleep(Duration::from_secs_f64(processing_delay)).await;

    state.metrics.record_order(processing_delay);
    state.metrics.record_request("POST", "/order");

    state.publish_metrics(vec![
        MetricDatum::count("OrdersCreated", 1.0),
        MetricDatum::seconds("OrderProcessingTime", processing_delay),
    ]);

    let order_id = format!("ORD-{}", Utc::now().timestamp());
    Ok(ProcessedOrder {
        processing_time: processing_delay,
        order_id,
    })
}

/// Create an order - demonstrates business metric collection
pub async fn create_order(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let start = Instant::now();

    let response = match process_order(&state).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": "Order created",
                "processing_time": order.processing_time,
                "order_id": order.order_id,
            })),
        ),
        Err(err) => {
            state.metrics.record_error("order_creation_error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
        }
    };

    // Observed on both the success and error path.
    state
        .metrics
        .observe_request_duration("/order", start.elapsed().as_secs_f64());

    response
}

pub async fn get_users(State(state): State<AppState>) -> Json<Value> {
    state.metrics.record_request("GET", "/users");
    Json(json!({ "active_users": state.active_users() }))
}

/// Simulate a batch of user logins - demonstrates the gauge metric
pub async fn add_users(State(state): State<AppState>) -> Json<Value> {
    let new_users = rand::thread_rng().gen_range(1..=5u32);
    let active = state.admit_users(new_users);

    state.publish_metrics(vec![MetricDatum::count("ActiveUsers", f64::from(active))]);
    state.metrics.record_request("POST", "/users");

    Json(json!({ "active_users": active, "new_users": new_users }))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    state.metrics.record_request("GET", "/health");
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Endpoint to generate errors for testing alerting pipelines
pub async fn generate_error(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    state.metrics.record_error("test_error");
    state.publish_metrics(vec![MetricDatum::count("ErrorRate", 1.0)]);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "error",
            "message": "Test error generated for alerting validation"
        })),
    )
}
