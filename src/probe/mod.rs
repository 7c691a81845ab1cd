//! Endpoint reachability probing
//!
//! One coarse reachability check per configured endpoint. The probes are
//! liveness checks, not protocol validation: the signaling and peer discovery
//! servers do not speak HTTP on their service ports, so any HTTP-level
//! response at all proves the process is alive and listening.

pub mod prober;
pub mod types;

pub use prober::EndpointProber;
pub use types::{Endpoint, ProbeResult, Protocol};
