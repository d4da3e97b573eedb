use futures_util::future::join_all;
use log::debug;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::DependencyEndpoint;
use crate::error::MonitorError;

/// Best-effort reachability checks for external dependencies
///
/// One bounded-timeout GET per dependency per call, no retries and no
/// circuit breaking. Probes run concurrently; a hung dependency costs at
/// most the configured timeout regardless of how many others are checked.
pub struct DependencyProber {
    client: Client,
    endpoints: Vec<DependencyEndpoint>,
    timeout: Duration,
}

impl DependencyProber {
    pub fn new(endpoints: Vec<DependencyEndpoint>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            timeout,
        }
    }

    pub fn endpoints(&self) -> &[DependencyEndpoint] {
        &self.endpoints
    }

    /// Check every configured dependency concurrently
    ///
    /// HTTP 200 maps to `true`; any transport error, timeout, or other
    /// status maps to `false`. One failing probe never blocks or fails
    /// the others.
    pub async fn check_all(&self) -> HashMap<String, bool> {
        let checks = self.endpoints.iter().map(|endpoint| async move {
            let reachable = match self.probe(endpoint).await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Dependency probe failed: {}", e);
                    false
                }
            };
            (endpoint.name.clone(), reachable)
        });

        join_all(checks).await.into_iter().collect()
    }

    /// Probe a single dependency
    pub async fn probe(&self, endpoint: &DependencyEndpoint) -> Result<(), MonitorError> {
        match timeout(self.timeout, self.client.get(&endpoint.url).send()).await {
            Ok(Ok(response)) => {
                if response.status() == StatusCode::OK {
                    Ok(())
                } else {
                    Err(MonitorError::ProbeFailure(format!(
                        "{} returned HTTP {}",
                        endpoint.name,
                        response.status()
                    )))
                }
            }
            Ok(Err(e)) => Err(MonitorError::ProbeFailure(format!(
                "{} request failed: {}",
                endpoint.name, e
            ))),
            Err(_) => Err(MonitorError::ProbeFailure(format!(
                "{} timed out after {:?}",
                endpoint.name, self.timeout
            ))),
        }
    }
}
