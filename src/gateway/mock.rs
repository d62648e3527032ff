//! In-memory collaborators for tests.

use super::{Authorizer, GatewayError, Notifier, ReminderScheduler};
use crate::domain::{ChatId, ParticipantId, Reminder};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Notifier that records every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(ChatId, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose sends always fail (after being recorded).
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((chat, text.to_string()));
        if self.fail {
            return Err(GatewayError::Network("simulated outage".to_string()));
        }
        Ok(())
    }
}

/// Scheduler that keeps reminders in memory.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<Reminder>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<Reminder> {
        self.scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn schedule(&self, reminder: Reminder) -> Result<(), GatewayError> {
        self.scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reminder);
        Ok(())
    }
}

/// Authorizer whose backend is down: every lookup errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableAuthorizer;

#[async_trait]
impl Authorizer for UnreachableAuthorizer {
    async fn is_privileged(&self, _chat: ChatId, _user: ParticipantId) -> Result<bool, GatewayError> {
        Err(GatewayError::Network("authorization backend unreachable".to_string()))
    }
}
