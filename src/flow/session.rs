use super::states::FlowState;
use crate::error::{ApprovalError, ApprovalResult};
use crate::selection::Selection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Idle time after which an unsubmitted session is discarded
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// State carried between the rounds of one approval workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSession {
    pub token: Uuid,
    pub state: FlowState,
    /// Agent narrowing was requested in an earlier round
    pub filter_agents: bool,
    /// Selection submitted in the first round
    pub selection: Selection,
    pub updated_at: DateTime<Utc>,
}

impl FlowSession {
    pub fn new() -> Self {
        Self {
            token: Uuid::new_v4(),
            state: FlowState::Initial,
            filter_agents: false,
            selection: Selection::new(),
            updated_at: Utc::now(),
        }
    }

    /// Move to `next`, rejecting transitions the workflow does not allow
    pub fn transition(&mut self, next: FlowState) -> ApprovalResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ApprovalError::flow_state(format!(
                "session {} cannot move from {} to {next}",
                self.token, self.state
            )));
        }
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Idle for longer than `ttl` as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.updated_at)
            .to_std()
            .is_ok_and(|idle| idle > ttl)
    }
}

impl Default for FlowSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage for flow sessions keyed by token
#[async_trait]
pub trait FlowSessionStore: Send + Sync {
    /// Expired sessions load as `None`
    async fn load(&self, token: Uuid) -> ApprovalResult<Option<FlowSession>>;

    async fn save(&self, session: &FlowSession) -> ApprovalResult<()>;

    async fn remove(&self, token: Uuid) -> ApprovalResult<()>;

    /// Drop every session expired as of `now`, returning how many were dropped
    async fn purge_expired(&self, now: DateTime<Utc>) -> ApprovalResult<usize>;
}

#[derive(Debug)]
pub struct InMemoryFlowSessionStore {
    sessions: DashMap<Uuid, FlowSession>,
    ttl: Duration,
}

impl Default for InMemoryFlowSessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl InMemoryFlowSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl FlowSessionStore for InMemoryFlowSessionStore {
    async fn load(&self, token: Uuid) -> ApprovalResult<Option<FlowSession>> {
        let now = Utc::now();
        let session = self.sessions.get(&token).map(|entry| entry.value().clone());

        match session {
            Some(session) if session.is_expired(now, self.ttl) => {
                self.sessions.remove(&token);
                debug!(%token, "Flow session expired");
                Ok(None)
            }
            session => Ok(session),
        }
    }

    async fn save(&self, session: &FlowSession) -> ApprovalResult<()> {
        self.sessions.insert(session.token, session.clone());
        Ok(())
    }

    async fn remove(&self, token: Uuid) -> ApprovalResult<()> {
        self.sessions.remove(&token);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> ApprovalResult<usize> {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_expired(now, self.ttl));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!(purged, remaining = self.sessions.len(), "Purged expired flow sessions");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_transition_guard() {
        let mut session = FlowSession::new();
        session
            .transition(FlowState::AwaitingAgentFilterChoice)
            .unwrap();
        session.transition(FlowState::AwaitingAgentSelection).unwrap();
        session.transition(FlowState::Submitted).unwrap();

        let err = session
            .transition(FlowState::AwaitingAgentSelection)
            .unwrap_err();
        assert!(matches!(err, ApprovalError::FlowState { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryFlowSessionStore::new();
        let session = FlowSession::new();

        store.save(&session).await.unwrap();
        assert_eq!(store.load(session.token).await.unwrap(), Some(session.clone()));

        store.remove(session.token).await.unwrap();
        assert_eq!(store.load(session.token).await.unwrap(), None);
        assert!(store.is_empty());
    }

    fn idle_session(idle: chrono::Duration) -> FlowSession {
        let mut session = FlowSession::new();
        session.updated_at = Utc::now() - idle;
        session
    }

    #[test]
    fn test_session_expiry() {
        let session = idle_session(chrono::Duration::minutes(10));
        let now = Utc::now();

        assert!(session.is_expired(now, Duration::from_secs(60)));
        assert!(!session.is_expired(now, Duration::from_secs(3600)));
        // A clock that moved backwards does not expire anything
        assert!(!session.is_expired(session.updated_at - chrono::Duration::minutes(1), Duration::ZERO));
    }

    #[tokio::test]
    async fn test_expired_sessions_are_purged() {
        let store = InMemoryFlowSessionStore::with_ttl(Duration::from_secs(60));
        let fresh = FlowSession::new();
        store.save(&fresh).await.unwrap();
        for _ in 0..5 {
            store
                .save(&idle_session(chrono::Duration::hours(2)))
                .await
                .unwrap();
        }
        assert_eq!(store.len(), 6);

        assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 5);
        assert_eq!(store.len(), 1);
        assert!(store.load(fresh.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_session_loads_as_unknown() {
        let store = InMemoryFlowSessionStore::with_ttl(Duration::from_secs(60));
        let stale = idle_session(chrono::Duration::hours(2));
        store.save(&stale).await.unwrap();

        assert_eq!(store.load(stale.token).await.unwrap(), None);
        assert!(store.is_empty());
    }
}
