//! Kickoff reminders as plain data.

use crate::domain::{ChatId, MatchId};
use chrono::{DateTime, Utc};

/// A reminder to deliver to a chat shortly before kickoff.
///
/// Description and start label are copied at scheduling time, so a reminder
/// stays deliverable even if its match is deleted in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub chat_id: ChatId,
    pub match_id: MatchId,
    pub fire_at: DateTime<Utc>,
    pub description: String,
    pub start_label: String,
}

impl Reminder {
    pub fn message_text(&self) -> String {
        format!(
            "Reminder: {} kicks off at {}. Last chance to submit your prediction (match #{}).",
            self.description, self.start_label, self.match_id
        )
    }
}

/// A pending reminder as stored in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedReminder {
    pub id: i64,
    pub reminder: Reminder,
}
