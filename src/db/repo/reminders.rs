//! Reminder queue operations for the repository.

use crate::domain::{ChatId, MatchId, QueuedReminder, Reminder};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Repository;

impl Repository {
    /// Queue a reminder and return its id.
    pub async fn enqueue_reminder(&self, reminder: &Reminder) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO reminders (chat_id, match_id, fire_at_ms, description, start_label)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(reminder.chat_id.as_i64())
        .bind(reminder.match_id.as_i64())
        .bind(reminder.fire_at.timestamp_millis())
        .bind(reminder.description.as_str())
        .bind(reminder.start_label.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Pending reminders whose fire time is at or before `now`, oldest first.
    pub async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QueuedReminder>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, match_id, fire_at_ms, description, start_label
            FROM reminders
            WHERE fire_at_ms <= ?
            ORDER BY fire_at_ms ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(now.timestamp_millis())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(reminder_from_row).collect()
    }

    /// Drop a reminder from the queue once its delivery has been attempted.
    ///
    /// Returns `false` if it was already removed.
    pub async fn remove_reminder(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn reminders_for_match(
        &self,
        match_id: MatchId,
    ) -> Result<Vec<QueuedReminder>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, match_id, fire_at_ms, description, start_label
            FROM reminders
            WHERE match_id = ?
            ORDER BY fire_at_ms ASC, id ASC
            "#,
        )
        .bind(match_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(reminder_from_row).collect()
    }
}

fn reminder_from_row(row: &SqliteRow) -> Result<QueuedReminder, sqlx::Error> {
    let fire_at_ms: i64 = row.try_get("fire_at_ms")?;
    let fire_at = Utc
        .timestamp_millis_opt(fire_at_ms)
        .single()
        .ok_or_else(|| sqlx::Error::Decode(format!("invalid fire_at_ms {}", fire_at_ms).into()))?;

    Ok(QueuedReminder {
        id: row.try_get("id")?,
        reminder: Reminder {
            chat_id: ChatId::new(row.try_get("chat_id")?),
            match_id: MatchId::new(row.try_get("match_id")?),
            fire_at,
            description: row.try_get("description")?,
            start_label: row.try_get("start_label")?,
        },
    })
}
