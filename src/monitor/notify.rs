//! Verdict change notification

use crate::logger::{self, LogTag};
use crate::status::aggregator::StatusSnapshot;
use crate::status::formatters;
use crate::status::Verdict;
use crate::subscribers::SubscriberDb;
use crate::telegram::MessageSender;

/// Deliver change reports for one cycle.
///
/// Every auto-enabled subscriber whose stored verdict differs from the cycle
/// verdict gets the full report ("unset" differs from every tier, so new
/// subscribers are told about the first verdict observed after they enable
/// notifications). `last_verdict` is only advanced after a successful
/// delivery - a failed send leaves it unchanged, which makes the next cycle
/// retry automatically. One subscriber's failure never blocks the others.
///
/// Returns the number of notifications delivered.
pub async fn notify_cycle(
    snapshot: &StatusSnapshot,
    subscribers: &[(i64, Option<Verdict>)],
    db: &SubscriberDb,
    sender: &dyn MessageSender,
) -> usize {
    let verdict = snapshot.verdict;
    let report = formatters::format_report(snapshot);
    let mut delivered = 0;

    for (chat_id, last_verdict) in subscribers {
        if *last_verdict == Some(verdict) {
            continue;
        }

        match sender.send(*chat_id, &report).await {
            Ok(()) => {
                if let Err(e) = db.update_last_verdict(*chat_id, verdict) {
                    logger::error(
                        LogTag::Monitor,
                        &format!(
                            "Failed to record verdict for chat {}: {:#}",
                            chat_id, e
                        ),
                    );
                    continue;
                }
                delivered += 1;
                logger::debug(
                    LogTag::Monitor,
                    &format!("Notified chat {} of {} verdict", chat_id, verdict),
                );
            }
            Err(e) => {
                // last_verdict stays as-is; next cycle retries
                logger::warning(
                    LogTag::Monitor,
                    &format!(
                        "Delivery to chat {} failed, will retry next cycle: {}",
                        chat_id, e
                    ),
                );
            }
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Endpoint, ProbeResult, Protocol};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records sends; chat ids listed in `failing` report delivery failure.
    struct MockSender {
        sent: Mutex<Vec<(i64, String)>>,
        failing: Vec<i64>,
    }

    impl MockSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: Vec::new(),
            }
        }

        fn failing_for(chat_ids: Vec<i64>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: chat_ids,
            }
        }

        fn sent(&self) -> Vec<(i64, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSender for MockSender {
        async fn send(&self, chat_id: i64, text: &str) -> Result<(), String> {
            if self.failing.contains(&chat_id) {
                return Err("transport error".to_string());
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn endpoint(protocol: Protocol) -> Endpoint {
        let (address, port) = match protocol {
            Protocol::Signaling => ("sig.example.com", 443),
            Protocol::Relay => ("turn.example.com", 5349),
            Protocol::Peer => ("stun.example.com", 3478),
        };
        Endpoint {
            address: address.to_string(),
            port,
            protocol,
        }
    }

    /// Signaling 20ms, relay 30ms, peer unreachable -> LIMITED
    fn limited_snapshot() -> StatusSnapshot {
        let snapshot = StatusSnapshot::new(vec![
            ProbeResult::alive(endpoint(Protocol::Signaling), Duration::from_millis(20)),
            ProbeResult::alive(endpoint(Protocol::Relay), Duration::from_millis(30)),
            ProbeResult::down(endpoint(Protocol::Peer), "timeout after 3s".to_string()),
        ]);
        assert_eq!(snapshot.verdict, Verdict::Limited);
        snapshot
    }

    fn db_with_subscriber(chat_id: i64, last_verdict: Option<Verdict>) -> SubscriberDb {
        let db = SubscriberDb::open_in_memory().unwrap();
        db.upsert(chat_id).unwrap();
        db.set_auto_notify(chat_id, true).unwrap();
        if let Some(verdict) = last_verdict {
            db.update_last_verdict(chat_id, verdict).unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_changed_verdict_sends_exactly_one_report() {
        let db = db_with_subscriber(42, Some(Verdict::Optimal));
        let sender = MockSender::new();
        let snapshot = limited_snapshot();

        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &sender).await;

        assert_eq!(delivered, 1);
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 42);
        assert!(sent[0].1.contains("LIMITED"));

        assert_eq!(
            db.get(42).unwrap().unwrap().last_verdict,
            Some(Verdict::Limited)
        );
    }

    #[tokio::test]
    async fn test_unchanged_verdict_sends_nothing() {
        let db = db_with_subscriber(42, Some(Verdict::Limited));
        let sender = MockSender::new();
        let snapshot = limited_snapshot();

        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &sender).await;

        assert_eq!(delivered, 0);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unset_verdict_is_distinct_from_every_tier() {
        let db = db_with_subscriber(42, None);
        let sender = MockSender::new();
        let snapshot = limited_snapshot();

        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &sender).await;

        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_last_verdict_and_retries() {
        let db = db_with_subscriber(42, Some(Verdict::Optimal));
        let snapshot = limited_snapshot();

        // First cycle: delivery fails, last_verdict must stay OPTIMAL
        let failing = MockSender::failing_for(vec![42]);
        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &failing).await;

        assert_eq!(delivered, 0);
        assert_eq!(
            db.get(42).unwrap().unwrap().last_verdict,
            Some(Verdict::Optimal)
        );

        // Later cycle with the same verdict re-attempts delivery
        let working = MockSender::new();
        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &working).await;

        assert_eq!(delivered, 1);
        assert_eq!(
            db.get(42).unwrap().unwrap().last_verdict,
            Some(Verdict::Limited)
        );
    }

    #[tokio::test]
    async fn test_one_failing_subscriber_does_not_block_others() {
        let db = SubscriberDb::open_in_memory().unwrap();
        for chat_id in [1, 2, 3] {
            db.upsert(chat_id).unwrap();
            db.set_auto_notify(chat_id, true).unwrap();
        }

        let sender = MockSender::failing_for(vec![2]);
        let snapshot = limited_snapshot();

        let subscribers = db.list_auto_enabled().unwrap();
        let delivered = notify_cycle(&snapshot, &subscribers, &db, &sender).await;

        assert_eq!(delivered, 2);
        let notified: Vec<i64> = sender.sent().iter().map(|(id, _)| *id).collect();
        assert_eq!(notified, vec![1, 3]);

        assert_eq!(db.get(2).unwrap().unwrap().last_verdict, None);
        assert_eq!(
            db.get(1).unwrap().unwrap().last_verdict,
            Some(Verdict::Limited)
        );
    }
}
