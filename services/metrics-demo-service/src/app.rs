use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tracing::warn;

use crate::cloud::{MetricDatum, MetricsPublisher};
use crate::handlers::{
    add_users, create_order, generate_error, get_users, health, index, metrics_endpoint,
};
use crate::metrics::AppMetrics;

pub const MAX_ACTIVE_USERS: u32 = 100;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<AppMetrics>,
    pub publisher: Arc<dyn MetricsPublisher>,
    active_users: Arc<Mutex<u32>>,
}

impl AppState {
    pub fn new(metrics: AppMetrics, publisher: Arc<dyn MetricsPublisher>) -> Self {
        Self {
            metrics: Arc::new(metrics),
            publisher,
            active_users: Arc::new(Mutex::new(0)),
        }
    }

    /// Fire-and-forget publish to the cloud metrics API. Failures are logged
    /// and must never reach the HTTP response path.
    pub fn publish_metrics(&self, data: Vec<MetricDatum>) {
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            if let Err(err) = publisher.publish(&data).await {
                warn!(?err, "Failed to publish cloud metrics");
            }
        });
    }

    /// Admit a batch of logins. The add and the clamp happen inside one
    /// critical section so concurrent posts cannot lose updates or push the
    /// count past the cap.
    pub fn admit_users(&self, new_users: u32) -> u32 {
        let mut active = self.active_users.lock().unwrap();
        *active = (*active + new_users).min(MAX_ACTIVE_USERS);
        self.metrics.set_active_users(*active);
        *active
    }

    pub fn active_users(&self) -> u32 {
        *self.active_users.lock().unwrap()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics_endpoint))
        .route("/order", post(create_order))
        .route("/users", get(get_users).post(add_users))
        .route("/health", get(health))
        .route("/error", get(generate_error))
        .with_state(state)
}
