use serde::Deserialize;
use std::time::Duration;

/// Maximum length of the diagnostic string carried in a probe result.
/// Keeps notification messages bounded.
const MAX_ERROR_LEN: usize = 50;

/// Role of an endpoint in the calling service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Call setup / signaling server
    Signaling,
    /// TURN media relay
    Relay,
    /// STUN peer discovery server
    Peer,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Signaling => "signaling",
            Protocol::Relay => "relay",
            Protocol::Peer => "peer",
        }
    }

    /// Per-protocol probe timeout. The relay gets a longer budget because a
    /// strict success response is required from it.
    pub fn probe_timeout(&self) -> Duration {
        match self {
            Protocol::Signaling | Protocol::Peer => Duration::from_secs(3),
            Protocol::Relay => Duration::from_secs(5),
        }
    }
}

/// One monitored network endpoint. Loaded from config at startup,
/// immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl Endpoint {
    /// URL the reachability probe is issued against
    pub fn probe_url(&self) -> String {
        format!("http://{}:{}/", self.address, self.port)
    }

    /// Short display label for reports and logs
    pub fn label(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Outcome of probing one endpoint in one cycle. Ephemeral - consumed by the
/// aggregator, never persisted.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub reachable: bool,
    pub latency: Option<Duration>,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn alive(endpoint: Endpoint, latency: Duration) -> Self {
        Self {
            endpoint,
            reachable: true,
            latency: Some(latency),
            error: None,
        }
    }

    pub fn down(endpoint: Endpoint, error: String) -> Self {
        Self {
            endpoint,
            reachable: false,
            latency: None,
            error: Some(truncate_error(&error)),
        }
    }
}

/// Truncate a diagnostic string to MAX_ERROR_LEN characters (char-safe)
pub fn truncate_error(error: &str) -> String {
    if error.chars().count() <= MAX_ERROR_LEN {
        return error.to_string();
    }
    let truncated: String = error.chars().take(MAX_ERROR_LEN - 3).collect();
    format!("{}...", truncated)
}
