// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session holder and auth state events.
//!
//! The holder is an explicit value shared by every request the adapter
//! builds, so callers can inject one per user or per test. Reads never
//! block; transitions are broadcast to subscribers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Capacity of the auth event channel. Slow subscribers skip older events.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Authenticated user as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Backend role claim (usually "authenticated"), not the app role.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Access/refresh token pair held in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Expiry as a Unix timestamp.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Session carrying only a bearer token (e.g. taken from a request header).
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in: None,
            expires_at: None,
            refresh_token: None,
            user: None,
        }
    }

    /// Fill `expires_at` from `expires_in` when the server only sent the latter.
    pub fn with_computed_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            if let Some(expires_in) = self.expires_in {
                self.expires_at = Some(chrono::Utc::now().timestamp().saturating_add(expires_in));
            }
        }
        self
    }
}

/// Kind of auth state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl std::fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthChangeEvent::InitialSession => "INITIAL_SESSION",
            AuthChangeEvent::SignedIn => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
            AuthChangeEvent::TokenRefreshed => "TOKEN_REFRESHED",
        };
        f.write_str(name)
    }
}

/// One transition as delivered to subscribers.
#[derive(Debug, Clone)]
pub struct AuthStateChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

/// Shared, injectable holder for the current session.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<watch::Sender<Option<Session>>>,
    events: broadcast::Sender<AuthStateChange>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Empty holder (signed out).
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            current: Arc::new(current),
            events,
        }
    }

    /// Holder seeded with an existing session. No event is emitted.
    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        store.current.send_replace(Some(session));
        store
    }

    /// Snapshot of the current session.
    pub fn get(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Current bearer token, if signed in.
    pub fn access_token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Replace the session and notify subscribers.
    pub fn set(&self, session: Session, event: AuthChangeEvent) {
        self.current.send_replace(Some(session.clone()));
        self.emit(event, Some(session));
    }

    /// Drop the session and notify subscribers with `SignedOut`.
    pub fn clear(&self) {
        self.current.send_replace(None);
        self.emit(AuthChangeEvent::SignedOut, None);
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        // No subscribers is not an error.
        let _ = self.events.send(AuthStateChange { event, session });
    }

    /// Raw event stream. Does not replay the initial session.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }

    /// Invoke `callback` with `InitialSession` and then on every transition.
    ///
    /// Must be called within a tokio runtime. Delivery stops when the
    /// returned [`Subscription`] is unsubscribed or dropped.
    pub fn on_change<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(AuthChangeEvent, Option<Session>) + Send + 'static,
    {
        let mut rx = self.events.subscribe();
        let initial = self.get();

        let handle = tokio::spawn(async move {
            callback(AuthChangeEvent::InitialSession, initial);
            loop {
                match rx.recv().await {
                    Ok(change) => callback(change.event, change.session),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth state subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { handle }
    }
}

/// Handle returned by [`SessionStore::on_change`].
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop receiving auth events.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn session(token: &str) -> Session {
        Session::from_access_token(token)
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SessionStore::new();
        assert!(store.get().is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let store = SessionStore::new();
        store.set(session("abc"), AuthChangeEvent::SignedIn);
        assert_eq!(store.access_token().as_deref(), Some("abc"));

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set(session("shared"), AuthChangeEvent::SignedIn);
        assert_eq!(other.access_token().as_deref(), Some("shared"));
    }

    #[test]
    fn test_computed_expiry() {
        let mut s = session("t");
        s.expires_in = Some(3600);
        let s = s.with_computed_expiry();
        let now = chrono::Utc::now().timestamp();
        let exp = s.expires_at.expect("expiry filled in");
        assert!(exp >= now + 3590 && exp <= now + 3600);
    }

    #[test]
    fn test_computed_expiry_saturates() {
        let mut s = session("t");
        s.expires_in = Some(i64::MAX);
        let s = s.with_computed_expiry();
        assert_eq!(s.expires_at, Some(i64::MAX));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(AuthChangeEvent::InitialSession.to_string(), "INITIAL_SESSION");
        assert_eq!(AuthChangeEvent::TokenRefreshed.to_string(), "TOKEN_REFRESHED");
        assert_eq!(
            serde_json::to_string(&AuthChangeEvent::SignedOut).unwrap(),
            "\"SIGNED_OUT\""
        );
    }

    #[tokio::test]
    async fn test_on_change_fires_initial_then_transitions() {
        let store = SessionStore::with_session(session("first"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store.on_change(move |event, session| {
            let _ = tx.send((event, session.map(|s| s.access_token)));
        });

        let (event, token) = rx.recv().await.unwrap();
        assert_eq!(event, AuthChangeEvent::InitialSession);
        assert_eq!(token.as_deref(), Some("first"));

        store.set(session("second"), AuthChangeEvent::SignedIn);
        let (event, token) = rx.recv().await.unwrap();
        assert_eq!(event, AuthChangeEvent::SignedIn);
        assert_eq!(token.as_deref(), Some("second"));

        store.clear();
        let (event, token) = rx.recv().await.unwrap();
        assert_eq!(event, AuthChangeEvent::SignedOut);
        assert!(token.is_none());

        sub.unsubscribe();
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = SessionStore::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store.on_change(move |event, _| {
            let _ = tx.send(event);
        });
        assert_eq!(rx.recv().await, Some(AuthChangeEvent::InitialSession));

        sub.unsubscribe();
        tokio::task::yield_now().await;
        store.set(session("late"), AuthChangeEvent::SignedIn);

        // The task was aborted, so the sender is dropped and nothing arrives.
        let next = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(matches!(next, Ok(None) | Err(_)));
    }
}
