use super::{GatewayError, Notifier};
use crate::clock::Clock;
use crate::db::Repository;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument, warn};

const DEFAULT_BATCH_SIZE: usize = 50;

/// Background task delivering queued reminders once they fall due.
pub struct ReminderRunner {
    repo: Arc<Repository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    batch_size: usize,
}

impl ReminderRunner {
    pub fn new(
        repo: Arc<Repository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            repo,
            notifier,
            clock,
            poll_interval,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Poll forever. Errors are logged and the next tick tries again.
    pub async fn run(self) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Starting reminder runner"
        );

        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            match self.dispatch_due().await {
                Ok(0) => {}
                Ok(delivered) => info!(delivered, "Reminders dispatched"),
                Err(e) => error!(error = %e, "Reminder dispatch failed"),
            }
        }
    }

    /// Send every due reminder once and drop it from the queue.
    ///
    /// Delivery is attempted exactly once per reminder; a failed send is logged
    /// and not retried. Returns the number of successful deliveries.
    #[instrument(skip(self))]
    pub async fn dispatch_due(&self) -> Result<usize, GatewayError> {
        let due = self
            .repo
            .due_reminders(self.clock.now(), self.batch_size)
            .await?;
        if due.is_empty() {
            return Ok(0);
        }

        let sends = due.iter().map(|queued| {
            let text = queued.reminder.message_text();
            async move { self.notifier.send(queued.reminder.chat_id, &text).await }
        });
        let outcomes = join_all(sends).await;

        let mut delivered = 0;
        for (queued, outcome) in due.iter().zip(outcomes) {
            match outcome {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    reminder_id = queued.id,
                    match_id = %queued.reminder.match_id,
                    error = %e,
                    "Reminder delivery failed"
                ),
            }
            self.repo.remove_reminder(queued.id).await?;
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::repo::test_support::temp_repo;
    use crate::domain::{ChatId, MatchId, Reminder};
    use crate::gateway::RecordingNotifier;
    use chrono::{TimeZone, Utc};

    fn reminder(match_id: i64, minute: u32) -> Reminder {
        Reminder {
            chat_id: ChatId::new(-42),
            match_id: MatchId::new(match_id),
            fire_at: Utc.with_ymd_and_hms(2025, 6, 6, 18, minute, 0).unwrap(),
            description: format!("match {}", match_id),
            start_label: "06.06.2025 20:45".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatches_only_due_reminders_once() {
        let (repo, _temp) = temp_repo().await;
        let repo = Arc::new(repo);
        repo.enqueue_reminder(&reminder(1, 10)).await.unwrap();
        repo.enqueue_reminder(&reminder(2, 40)).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 6, 18, 15, 0).unwrap(),
        ));
        let runner = ReminderRunner::new(
            repo.clone(),
            notifier.clone(),
            clock.clone(),
            Duration::from_millis(10),
        );

        assert_eq!(runner.dispatch_due().await.unwrap(), 1);
        assert_eq!(runner.dispatch_due().await.unwrap(), 0);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId::new(-42));
        assert!(sent[0].1.contains("match 1"));

        clock.advance(chrono::Duration::minutes(30));
        assert_eq!(runner.dispatch_due().await.unwrap(), 1);
        assert_eq!(notifier.sent().len(), 2);
        for id in [1, 2] {
            assert!(repo
                .reminders_for_match(MatchId::new(id))
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_retried() {
        let (repo, _temp) = temp_repo().await;
        let repo = Arc::new(repo);
        repo.enqueue_reminder(&reminder(1, 10)).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::failing());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 6, 19, 0, 0).unwrap(),
        ));
        let runner = ReminderRunner::new(repo.clone(), notifier.clone(), clock, Duration::from_millis(10));

        assert_eq!(runner.dispatch_due().await.unwrap(), 0);
        assert_eq!(runner.dispatch_due().await.unwrap(), 0);
        assert_eq!(notifier.sent().len(), 1);

        assert!(repo
            .reminders_for_match(MatchId::new(1))
            .await
            .unwrap()
            .is_empty());
    }
}
