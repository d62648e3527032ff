use super::{GatewayError, ReminderScheduler};
use crate::db::Repository;
use crate::domain::Reminder;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Persists reminders in the `reminders` table for [`super::ReminderRunner`] to deliver.
#[derive(Clone)]
pub struct StoredReminderScheduler {
    repo: Arc<Repository>,
}

impl StoredReminderScheduler {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ReminderScheduler for StoredReminderScheduler {
    async fn schedule(&self, reminder: Reminder) -> Result<(), GatewayError> {
        let id = self.repo.enqueue_reminder(&reminder).await?;
        debug!(
            reminder_id = id,
            match_id = %reminder.match_id,
            fire_at = %reminder.fire_at,
            "Reminder queued"
        );
        Ok(())
    }
}
