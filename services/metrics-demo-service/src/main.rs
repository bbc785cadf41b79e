use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use metrics_demo_service::app::{build_router, AppState};
use metrics_demo_service::cloud::CloudMetricsClient;
use metrics_demo_service::config::load_config;
use metrics_demo_service::metrics::AppMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_config()?;
    let metrics = AppMetrics::new()?;
    let publisher = CloudMetricsClient::new(
        config.cloud_endpoint.clone(),
        config.namespace.clone(),
        config.region.clone(),
        config.publish_timeout,
    )?;
    let state = AppState::new(metrics, Arc::new(publisher));
    let app = build_router(state);

    let addr = config.socket_addr()?;
    info!(%addr, region = %config.region, "starting metrics-demo-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
