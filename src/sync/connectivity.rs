use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::utils::error::{AppError, Result};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Network precondition checked before each sync run.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Considers the device online when the backend's port accepts a TCP
/// connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn for_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| AppError::ValidationError(format!("URL '{}' has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| AppError::ValidationError(format!("URL '{}' has no port", url)))?;

        Ok(Self {
            host: host.to_string(),
            port,
            timeout: PROBE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_online(&self) -> bool {
        let addr = (self.host.as_str(), self.port);
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, port = self.port, error = %e, "Backend unreachable");
                false
            }
            Err(_) => {
                tracing::debug!(host = %self.host, port = self.port, "Backend probe timed out");
                false
            }
        }
    }
}
