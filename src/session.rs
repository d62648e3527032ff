//! Two-step prediction input: pick a match, then send the score.
//!
//! Each (chat, user) pair has at most one pending pick. Transitions:
//! - `select`: idle or pending -> pending (a new pick replaces the old one)
//! - `complete`: pending -> idle, yielding the picked match
//! - `cancel`: pending -> idle
//! - timeout: a pending pick older than the session timeout is treated as idle

use crate::domain::{ChatId, MatchId, ParticipantId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat: ChatId,
    pub user: ParticipantId,
}

impl SessionKey {
    pub fn new(chat: ChatId, user: ParticipantId) -> Self {
        Self { chat, user }
    }
}

/// A match chosen by a user who has not sent a score yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPick {
    pub match_id: MatchId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no match selected, pick a match first")]
    NoActiveSession,
    #[error("match selection expired, pick the match again")]
    Expired,
}

pub struct SessionStore {
    pending: Mutex<HashMap<SessionKey, PendingPick>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Remember `match_id` as the user's pick. Also drops other expired picks.
    pub async fn select(&self, key: SessionKey, match_id: MatchId, now: DateTime<Utc>) -> PendingPick {
        let pick = PendingPick {
            match_id,
            expires_at: now + self.timeout,
        };

        let mut pending = self.pending.lock().await;
        pending.retain(|_, p| p.expires_at > now);
        pending.insert(key, pick);
        pick
    }

    /// Consume the pending pick.
    ///
    /// # Errors
    /// `NoActiveSession` when nothing was picked (or it was cancelled),
    /// `Expired` when the pick timed out; the expired pick is discarded.
    pub async fn complete(&self, key: SessionKey, now: DateTime<Utc>) -> Result<MatchId, SessionError> {
        let pick = self
            .pending
            .lock()
            .await
            .remove(&key)
            .ok_or(SessionError::NoActiveSession)?;

        if pick.expires_at <= now {
            return Err(SessionError::Expired);
        }
        Ok(pick.match_id)
    }

    /// Returns whether there was a pick to cancel.
    pub async fn cancel(&self, key: SessionKey) -> bool {
        self.pending.lock().await.remove(&key).is_some()
    }

    /// The live pick, without consuming it. An expired pick is discarded.
    pub async fn current(&self, key: SessionKey, now: DateTime<Utc>) -> Result<PendingPick, SessionError> {
        let mut pending = self.pending.lock().await;
        let pick = *pending.get(&key).ok_or(SessionError::NoActiveSession)?;
        if pick.expires_at <= now {
            pending.remove(&key);
            return Err(SessionError::Expired);
        }
        Ok(pick)
    }

    /// Drop all expired picks, returning how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, p| p.expires_at > now);
        before - pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(user: i64) -> SessionKey {
        SessionKey::new(ChatId::new(-1), ParticipantId::new(user))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 6, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_select_then_complete() {
        let store = SessionStore::new(Duration::minutes(5));
        store.select(key(1), MatchId::new(3), t0()).await;

        let picked = store.complete(key(1), t0() + Duration::minutes(1)).await;
        assert_eq!(picked, Ok(MatchId::new(3)));

        // The pick is consumed.
        assert_eq!(
            store.complete(key(1), t0()).await,
            Err(SessionError::NoActiveSession)
        );
    }

    #[tokio::test]
    async fn test_new_selection_replaces_old() {
        let store = SessionStore::new(Duration::minutes(5));
        store.select(key(1), MatchId::new(3), t0()).await;
        store.select(key(1), MatchId::new(4), t0()).await;
        assert_eq!(store.complete(key(1), t0()).await, Ok(MatchId::new(4)));
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let store = SessionStore::new(Duration::minutes(5));
        store.select(key(1), MatchId::new(3), t0()).await;
        assert_eq!(
            store.complete(key(2), t0()).await,
            Err(SessionError::NoActiveSession)
        );
        assert!(store.current(key(1), t0()).await.is_ok());
    }

    #[tokio::test]
    async fn test_timeout() {
        let store = SessionStore::new(Duration::minutes(5));
        store.select(key(1), MatchId::new(3), t0()).await;

        let late = t0() + Duration::minutes(5);
        assert_eq!(store.current(key(1), late).await, Err(SessionError::Expired));
        // Expiry discarded the pick.
        assert_eq!(
            store.complete(key(1), late).await,
            Err(SessionError::NoActiveSession)
        );
    }

    #[tokio::test]
    async fn test_cancel() {
        let store = SessionStore::new(Duration::minutes(5));
        assert!(!store.cancel(key(1)).await);
        store.select(key(1), MatchId::new(3), t0()).await;
        assert!(store.cancel(key(1)).await);
        assert_eq!(
            store.complete(key(1), t0()).await,
            Err(SessionError::NoActiveSession)
        );
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SessionStore::new(Duration::minutes(5));
        store.select(key(1), MatchId::new(3), t0()).await;
        store
            .select(key(2), MatchId::new(3), t0() + Duration::minutes(4))
            .await;

        assert_eq!(store.purge_expired(t0() + Duration::minutes(6)).await, 1);
        assert!(store
            .current(key(2), t0() + Duration::minutes(6))
            .await
            .is_ok());
    }
}
