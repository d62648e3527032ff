//! Collaborators that need no chat platform: a fixed admin list and a
//! notifier that only logs.

use super::{Authorizer, GatewayError, Notifier};
use crate::domain::{ChatId, ParticipantId};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

/// Grants privileges to a fixed set of user ids in every chat.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    admins: HashSet<i64>,
}

impl StaticAuthorizer {
    pub fn new(admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn is_privileged(&self, _chat: ChatId, user: ParticipantId) -> Result<bool, GatewayError> {
        Ok(self.admins.contains(&user.as_i64()))
    }
}

/// Writes outgoing messages to the log instead of a chat.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), GatewayError> {
        info!(chat_id = %chat, text = %text, "Outgoing message (no transport configured)");
        Ok(())
    }
}
