//! Telegram Bot API client: message delivery and chat-admin lookup.

use super::{Authorizer, GatewayError, Notifier};
use crate::domain::{ChatId, ParticipantId};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Member statuses that count as privileged for game administration.
const PRIVILEGED_STATUSES: &[&str] = &["creator", "administrator"];

const DEFAULT_RETRY_WINDOW: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
    retry_window: Duration,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("retry_window", &self.retry_window)
            .finish()
    }
}

impl TelegramClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            retry_window: DEFAULT_RETRY_WINDOW,
        }
    }

    /// Total time spent retrying one call before giving up.
    pub fn with_retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Call a Bot API method, retrying transport failures, 429s and 5xx responses.
    async fn call(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = self.method_url(method);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_window),
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(GatewayError::Network(describe(e))))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(GatewayError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(GatewayError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }

            // Telegram reports client errors in a JSON envelope; keep it for the message.
            let body = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(GatewayError::Parse(describe(e))))?;

            if !status.is_success() {
                return Err(backoff::Error::permanent(GatewayError::Http {
                    status: status.as_u16(),
                    message: envelope_description(&body),
                }));
            }
            Ok(body)
        })
        .await?;

        unwrap_envelope(body)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat: ChatId, text: &str) -> Result<(), GatewayError> {
        debug!(chat_id = %chat, "Sending Telegram message");
        let payload = serde_json::json!({
            "chat_id": chat.as_i64(),
            "text": text,
        });
        self.call("sendMessage", payload).await.map(|_| ())
    }
}

#[async_trait]
impl Authorizer for TelegramClient {
    async fn is_privileged(&self, chat: ChatId, user: ParticipantId) -> Result<bool, GatewayError> {
        let payload = serde_json::json!({
            "chat_id": chat.as_i64(),
            "user_id": user.as_i64(),
        });
        let member = self.call("getChatMember", payload).await?;
        let status = member
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| GatewayError::Parse("chat member without status".to_string()))?;

        debug!(chat_id = %chat, user_id = %user, status = %status, "Chat member status");
        Ok(is_privileged_status(status))
    }
}

/// Error text without the request URL, which carries the bot token.
fn describe(error: reqwest::Error) -> String {
    error.without_url().to_string()
}

pub fn is_privileged_status(status: &str) -> bool {
    PRIVILEGED_STATUSES.contains(&status)
}

/// Extract `result` from a `{"ok": true, "result": ...}` envelope.
fn unwrap_envelope(body: serde_json::Value) -> Result<serde_json::Value, GatewayError> {
    if body.get("ok").and_then(|ok| ok.as_bool()) != Some(true) {
        return Err(GatewayError::Api(envelope_description(&body)));
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| GatewayError::Parse("response without result".to_string()))
}

fn envelope_description(body: &serde_json::Value) -> String {
    body.get("description")
        .and_then(|d| d.as_str())
        .unwrap_or("unknown error")
        .to_string()
}
