use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_NAMESPACE: &str = "PeexProject/CustomMetrics";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricUnit {
    Count,
    Seconds,
}

/// One custom-metric datapoint as the remote metrics API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct MetricDatum {
    #[serde(rename = "MetricName")]
    pub metric_name: &'static str,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Unit")]
    pub unit: MetricUnit,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl MetricDatum {
    pub fn count(metric_name: &'static str, value: f64) -> Self {
        Self {
            metric_name,
            value,
            unit: MetricUnit::Count,
            timestamp: Utc::now(),
        }
    }

    pub fn seconds(metric_name: &'static str, value: f64) -> Self {
        Self {
            metric_name,
            value,
            unit: MetricUnit::Seconds,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct PutMetricDataRequest<'a> {
    #[serde(rename = "Namespace")]
    namespace: &'a str,
    #[serde(rename = "MetricData")]
    metric_data: &'a [MetricDatum],
}

/// Seam for the push-based metrics backend so tests can swap in recording or
/// failing publishers.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    async fn publish(&self, data: &[MetricDatum]) -> Result<()>;
}

/// HTTP client for the cloud metrics API. Publishing is best effort: callers
/// go through `AppState::publish_metrics`, which logs and drops any error
/// returned here.
pub struct CloudMetricsClient {
    client: Client,
    endpoint: Option<String>,
    namespace: String,
    region: String,
}

impl CloudMetricsClient {
    pub fn new(
        endpoint: Option<String>,
        namespace: String,
        region: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            namespace,
            region,
        })
    }

    /// Client with no endpoint configured. Every publish succeeds without
    /// touching the network.
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            endpoint: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

#[async_trait]
impl MetricsPublisher for CloudMetricsClient {
    async fn publish(&self, data: &[MetricDatum]) -> Result<()> {
        let Some(endpoint) = &self.endpoint else {
            debug!(
                datapoints = data.len(),
                "Cloud metrics endpoint not configured, dropping datapoints"
            );
            return Ok(());
        };

        let payload = PutMetricDataRequest {
            namespace: &self.namespace,
            metric_data: data,
        };
        let response = self
            .client
            .post(endpoint)
            .header("x-metrics-region", &self.region)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Cloud metrics API returned status {}",
                response.status()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datum_serializes_with_wire_field_names() {
        let datum = MetricDatum::count("OrdersCreated", 1.0);
        let value = serde_json::to_value(&datum).expect("serialize");
        assert_eq!(value["MetricName"], "OrdersCreated");
        assert_eq!(value["Value"], 1.0);
        assert_eq!(value["Unit"], "Count");
        assert!(value["Timestamp"].is_string());
    }

    #[test]
    fn request_envelope_carries_namespace() {
        let data = vec![MetricDatum::seconds("OrderProcessingTime", 0.25)];
        let payload = PutMetricDataRequest {
            namespace: DEFAULT_NAMESPACE,
            metric_data: &data,
        };
        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["Namespace"], "PeexProject/CustomMetrics");
        assert_eq!(value["MetricData"][0]["Unit"], "Seconds");
    }

    #[tokio::test]
    async fn disabled_client_publishes_without_io() {
        let client = CloudMetricsClient::disabled();
        client
            .publish(&[MetricDatum::count("ActiveUsers", 3.0)])
            .await
            .expect("disabled publish");
    }
}
