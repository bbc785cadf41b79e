use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cloud::{DEFAULT_NAMESPACE, DEFAULT_REGION};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub region: String,
    pub cloud_endpoint: Option<String>,
    pub namespace: String,
    pub publish_timeout: Duration,
}

impl ServiceConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST address '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

pub fn load_config() -> Result<ServiceConfig> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let region = env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());

    // No endpoint means the push client runs disabled and every publish is a
    // logged no-op.
    let cloud_endpoint = env::var("CLOUD_METRICS_ENDPOINT")
        .ok()
        .and_then(|value| normalize_optional(&value));

    let namespace =
        env::var("CLOUD_METRICS_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

    let publish_timeout = env::var("CLOUD_METRICS_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(1000));

    Ok(ServiceConfig {
        host,
        port,
        region,
        cloud_endpoint,
        namespace,
        publish_timeout,
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_optional_drops_blank_values() {
        assert_eq!(normalize_optional("  "), None);
        assert_eq!(normalize_optional(""), None);
        assert_eq!(
            normalize_optional(" http://collector:9106 "),
            Some("http://collector:9106".to_string())
        );
    }

    #[test]
    fn socket_addr_parses_host_and_port() {
        let config = ServiceConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            region: DEFAULT_REGION.to_string(),
            cloud_endpoint: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            publish_timeout: Duration::from_millis(1000),
        };
        let addr = config.socket_addr().expect("addr");
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn socket_addr_rejects_hostnames() {
        let config = ServiceConfig {
            host: "not-an-ip".to_string(),
            port: 8080,
            region: DEFAULT_REGION.to_string(),
            cloud_endpoint: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            publish_timeout: Duration::from_millis(1000),
        };
        assert!(config.socket_addr().is_err());
    }
}
