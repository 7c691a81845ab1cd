//! HTML message formatters for status reports

use crate::probe::ProbeResult;
use crate::status::aggregator::StatusSnapshot;
use std::time::Duration;

/// Format the full status report sent to subscribers and `/status` callers.
///
/// Overall tier, one line per endpoint with latency or the truncated error,
/// and the check timestamp.
pub fn format_report(snapshot: &StatusSnapshot) -> String {
    let mut report = format!(
        "{} <b>Call Service Status: {}</b>\n\n",
        snapshot.verdict.emoji(),
        snapshot.verdict.as_str()
    );

    for result in &snapshot.results {
        report.push_str(&format_endpoint_line(result));
        report.push('\n');
    }

    report.push_str(&format!(
        "\n<i>Checked at {}</i>",
        snapshot.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    report
}

fn format_endpoint_line(result: &ProbeResult) -> String {
    let name = result.endpoint.protocol.as_str();
    let label = result.endpoint.label();

    if result.reachable {
        match result.latency {
            Some(latency) => {
                format!("✅ {} <code>{}</code> {}", name, label, format_latency(latency))
            }
            None => format!("✅ {} <code>{}</code>", name, label),
        }
    } else {
        let reason = result.error.as_deref().unwrap_or("unreachable");
        format!("❌ {} <code>{}</code> {}", name, label, reason)
    }
}

pub fn format_latency(latency: Duration) -> String {
    format!("{}ms", latency.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Endpoint, Protocol};

    fn snapshot() -> StatusSnapshot {
        let signaling = Endpoint {
            address: "sig.example.com".to_string(),
            port: 443,
            protocol: Protocol::Signaling,
        };
        let relay = Endpoint {
            address: "turn.example.com".to_string(),
            port: 5349,
            protocol: Protocol::Relay,
        };
        let peer = Endpoint {
            address: "stun.example.com".to_string(),
            port: 3478,
            protocol: Protocol::Peer,
        };

        StatusSnapshot::new(vec![
            ProbeResult::alive(signaling, Duration::from_millis(20)),
            ProbeResult::alive(relay, Duration::from_millis(30)),
            ProbeResult::down(peer, "connection refused".to_string()),
        ])
    }

    #[test]
    fn test_report_contains_tier_and_endpoints() {
        let report = format_report(&snapshot());

        assert!(report.contains("LIMITED"));
        assert!(report.contains("🟡"));
        assert!(report.contains("✅ signaling <code>sig.example.com:443</code> 20ms"));
        assert!(report.contains("✅ relay <code>turn.example.com:5349</code> 30ms"));
        assert!(report.contains("❌ peer <code>stun.example.com:3478</code> connection refused"));
        assert!(report.contains("Checked at"));
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(Duration::from_millis(42)), "42ms");
    }
}
