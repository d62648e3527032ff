//! Collaborators the game core talks to but does not implement itself:
//! message delivery, reminder scheduling and the privilege oracle.

use crate::domain::{ChatId, ParticipantId, Reminder};
use async_trait::async_trait;
use thiserror::Error;

pub mod local;
pub mod mock;
pub mod runner;
pub mod scheduler;
pub mod telegram;

pub use local::{LogNotifier, StaticAuthorizer};
pub use mock::{RecordingNotifier, RecordingScheduler, UnreachableAuthorizer};
pub use runner::ReminderRunner;
pub use scheduler::StoredReminderScheduler;
pub use telegram::TelegramClient;

/// Delivers a text message to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), GatewayError>;
}

/// Accepts reminders for later delivery. Fire-and-forget from the caller's side.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn schedule(&self, reminder: Reminder) -> Result<(), GatewayError>;
}

/// Answers whether a user may run privileged commands in a chat.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_privileged(&self, chat: ChatId, user: ParticipantId) -> Result<bool, GatewayError>;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited")]
    RateLimited,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Http {
            status: 403,
            message: "Forbidden: bot was kicked".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 403: Forbidden: bot was kicked");
        assert_eq!(GatewayError::RateLimited.to_string(), "Rate limited");
    }
}
