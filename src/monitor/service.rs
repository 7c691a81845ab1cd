//! Monitor scheduler
//!
//! One long-lived background task driving the monitoring cycles. Cycles
//! never overlap: a cycle that overruns the interval delays the next one
//! (missed ticks are skipped, not queued).

use crate::logger::{self, LogTag};
use crate::monitor::notify;
use crate::probe::{Endpoint, EndpointProber};
use crate::status;
use crate::subscribers::SubscriberDb;
use crate::telegram::MessageSender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};

pub struct MonitorService {
    prober: Arc<EndpointProber>,
    endpoints: Vec<Endpoint>,
    db: Arc<SubscriberDb>,
    sender: Arc<dyn MessageSender>,
    check_interval: Duration,
}

impl MonitorService {
    pub fn new(
        prober: Arc<EndpointProber>,
        endpoints: Vec<Endpoint>,
        db: Arc<SubscriberDb>,
        sender: Arc<dyn MessageSender>,
        check_interval: Duration,
    ) -> Self {
        Self {
            prober,
            endpoints,
            db,
            sender,
            check_interval,
        }
    }

    /// Run cycles until shutdown is signalled. Store and delivery failures
    /// inside a cycle are logged and the scheduler continues to the next
    /// interval.
    pub async fn run(self, shutdown: Arc<Notify>) {
        let mut timer = interval(self.check_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        logger::info(
            LogTag::Monitor,
            &format!(
                "Monitoring {} endpoints (interval={}s)",
                self.endpoints.len(),
                self.check_interval.as_secs()
            ),
        );

        // Pinned outside the loop so a signal arriving mid-cycle still lands
        let shutdown = shutdown.notified();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    logger::info(LogTag::Monitor, "Monitor shutting down");
                    break;
                }
                _ = timer.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    async fn run_cycle(&self) {
        let snapshot = status::check_now(&self.prober, &self.endpoints).await;

        logger::info(
            LogTag::Monitor,
            &format!(
                "Cycle complete: verdict={} ({}/{} endpoints reachable)",
                snapshot.verdict,
                snapshot.results.iter().filter(|r| r.reachable).count(),
                snapshot.results.len()
            ),
        );

        let subscribers = match self.db.list_auto_enabled() {
            Ok(subscribers) => subscribers,
            Err(e) => {
                // Store unavailable: skip notification this cycle, keep running
                logger::error(
                    LogTag::Monitor,
                    &format!("Failed to load subscribers: {:#}", e),
                );
                return;
            }
        };

        if subscribers.is_empty() {
            return;
        }

        let delivered =
            notify::notify_cycle(&snapshot, &subscribers, &self.db, self.sender.as_ref()).await;

        if delivered > 0 {
            logger::info(
                LogTag::Monitor,
                &format!("Sent {} change notifications", delivered),
            );
        }
    }
}
