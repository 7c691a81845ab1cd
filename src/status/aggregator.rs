use crate::probe::{ProbeResult, Protocol};
use chrono::{DateTime, Utc};

/// Three-tier aggregate health classification, ordered
/// Critical < Limited < Optimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    /// Signaling or relay unreachable - calls cannot be established
    Critical,
    /// Calls work but peer discovery is down, so quality may suffer
    Limited,
    /// All endpoints reachable
    Optimal,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Optimal => "OPTIMAL",
            Verdict::Limited => "LIMITED",
            Verdict::Critical => "CRITICAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPTIMAL" => Some(Verdict::Optimal),
            "LIMITED" => Some(Verdict::Limited),
            "CRITICAL" => Some(Verdict::Critical),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Optimal => "🟢",
            Verdict::Limited => "🟡",
            Verdict::Critical => "🔴",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the verdict for one cycle's probe results.
///
/// Signaling and the relay are necessary for any call; peer discovery only
/// affects call quality, so its loss downgrades rather than fails the
/// verdict. A missing result for a protocol is treated as unreachable.
pub fn aggregate(results: &[ProbeResult]) -> Verdict {
    let reachable = |protocol: Protocol| {
        results
            .iter()
            .any(|r| r.endpoint.protocol == protocol && r.reachable)
    };

    if reachable(Protocol::Signaling) && reachable(Protocol::Relay) {
        if reachable(Protocol::Peer) {
            Verdict::Optimal
        } else {
            Verdict::Limited
        }
    } else {
        Verdict::Critical
    }
}

/// One cycle's verdict with the per-endpoint detail behind it
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub verdict: Verdict,
    pub results: Vec<ProbeResult>,
    pub checked_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn new(results: Vec<ProbeResult>) -> Self {
        Self {
            verdict: aggregate(&results),
            results,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Endpoint;
    use std::time::Duration;

    fn result(protocol: Protocol, reachable: bool) -> ProbeResult {
        let endpoint = Endpoint {
            address: "example.com".to_string(),
            port: 3478,
            protocol,
        };
        if reachable {
            ProbeResult::alive(endpoint, Duration::from_millis(20))
        } else {
            ProbeResult::down(endpoint, "timeout after 3s".to_string())
        }
    }

    #[test]
    fn test_all_reachable_is_optimal() {
        let results = vec![
            result(Protocol::Signaling, true),
            result(Protocol::Relay, true),
            result(Protocol::Peer, true),
        ];
        assert_eq!(aggregate(&results), Verdict::Optimal);
    }

    #[test]
    fn test_peer_down_is_limited() {
        let results = vec![
            result(Protocol::Signaling, true),
            result(Protocol::Relay, true),
            result(Protocol::Peer, false),
        ];
        assert_eq!(aggregate(&results), Verdict::Limited);
    }

    #[test]
    fn test_signaling_down_is_critical_regardless_of_peer() {
        for peer_up in [true, false] {
            let results = vec![
                result(Protocol::Signaling, false),
                result(Protocol::Relay, true),
                result(Protocol::Peer, peer_up),
            ];
            assert_eq!(aggregate(&results), Verdict::Critical);
        }
    }

    #[test]
    fn test_relay_down_is_critical_regardless_of_peer() {
        for peer_up in [true, false] {
            let results = vec![
                result(Protocol::Signaling, true),
                result(Protocol::Relay, false),
                result(Protocol::Peer, peer_up),
            ];
            assert_eq!(aggregate(&results), Verdict::Critical);
        }
    }

    #[test]
    fn test_missing_result_treated_as_unreachable() {
        // No peer result at all behaves like an unreachable peer
        let results = vec![
            result(Protocol::Signaling, true),
            result(Protocol::Relay, true),
        ];
        assert_eq!(aggregate(&results), Verdict::Limited);

        // Empty set is total too
        assert_eq!(aggregate(&[]), Verdict::Critical);
    }

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::Optimal > Verdict::Limited);
        assert!(Verdict::Limited > Verdict::Critical);
    }

    #[test]
    fn test_verdict_round_trip() {
        for verdict in [Verdict::Optimal, Verdict::Limited, Verdict::Critical] {
            assert_eq!(Verdict::from_str(verdict.as_str()), Some(verdict));
        }
        assert_eq!(Verdict::from_str("unknown"), None);
    }
}
