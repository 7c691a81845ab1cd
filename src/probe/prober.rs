use crate::logger::{self, LogTag};
use crate::probe::types::{Endpoint, ProbeResult, Protocol};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::time::Instant;

/// Issues reachability probes against configured endpoints.
///
/// Probe failures are never raised to the caller - they are captured into the
/// `ProbeResult` so one unreachable endpoint cannot abort the rest of a cycle.
pub struct EndpointProber {
    client: reqwest::Client,
}

impl EndpointProber {
    pub fn new() -> Result<Self> {
        // No client-level timeout: each request carries its own
        // protocol-specific timeout.
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client for probes")?;

        Ok(Self { client })
    }

    /// Probe a single endpoint, bounded by its protocol-specific timeout.
    pub async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let timeout = endpoint.protocol.probe_timeout();
        let start = Instant::now();

        let response = self
            .client
            .get(endpoint.probe_url())
            .timeout(timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let latency = start.elapsed();
                let status = response.status();

                let alive = match endpoint.protocol {
                    // The relay exposes a real HTTP status endpoint, so a
                    // strict success response is required.
                    Protocol::Relay => status.is_success(),
                    // Signaling and peer discovery do not speak HTTP on these
                    // ports; any response at all proves the process is alive.
                    Protocol::Signaling | Protocol::Peer => true,
                };

                if alive {
                    logger::debug(
                        LogTag::Probe,
                        &format!(
                            "{} {} reachable ({}ms)",
                            endpoint.protocol.as_str(),
                            endpoint.label(),
                            latency.as_millis()
                        ),
                    );
                    ProbeResult::alive(endpoint.clone(), latency)
                } else {
                    ProbeResult::down(endpoint.clone(), format!("HTTP {}", status))
                }
            }
            Err(e) if e.is_timeout() => ProbeResult::down(
                endpoint.clone(),
                format!("timeout after {}s", timeout.as_secs()),
            ),
            Err(e) => {
                // Prefer the innermost cause: reqwest's own Display repeats
                // the full URL, which would blow the truncation budget.
                let mut source: &dyn std::error::Error = &e;
                while let Some(inner) = source.source() {
                    source = inner;
                }
                ProbeResult::down(endpoint.clone(), source.to_string())
            }
        }
    }

    /// Probe all endpoints concurrently. Cycle latency stays close to the
    /// slowest single probe's timeout rather than their sum.
    pub async fn probe_all(&self, endpoints: &[Endpoint]) -> Vec<ProbeResult> {
        join_all(endpoints.iter().map(|e| self.probe(e))).await
    }
}
