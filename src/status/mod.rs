//! Verdict aggregation and status reporting
//!
//! Reduces a cycle's probe results to a three-tier verdict and formats the
//! detailed report sent to subscribers and `/status` callers.

pub mod aggregator;
pub mod formatters;

pub use aggregator::{aggregate, StatusSnapshot, Verdict};

use crate::probe::{Endpoint, EndpointProber};

/// Run one full probe pass right now and aggregate the results.
///
/// Shared by the monitor cycle and the on-demand `/status` command.
pub async fn check_now(prober: &EndpointProber, endpoints: &[Endpoint]) -> StatusSnapshot {
    let results = prober.probe_all(endpoints).await;
    StatusSnapshot::new(results)
}
