//! Periodic monitoring
//!
//! The scheduler drives Probe → Aggregate → Notify cycles on a fixed
//! interval; the notifier diffs the cycle verdict against each subscriber's
//! stored verdict and delivers change reports.

pub mod notify;
pub mod service;

pub use service::MonitorService;
