//! Authoritative session owner
//!
//! `Session` is the single place that reads and writes auth state. It wraps a
//! `KeyValueStore` using the key names the web client used, publishes
//! sign-in/sign-out transitions on a watch channel, and owns the lock that
//! keeps token refreshes single-flight.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::auth::{TokenClaims, TokenPair};
use crate::models::UserRole;
use crate::storage::{KeyValueStore, MemoryStorage};

/// Storage keys
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const ROLE: &str = "role";
    pub const USER_ID: &str = "user_id";
    pub const USER_NAME: &str = "user_name";

    pub const ALL: &[&str] = &[ACCESS_TOKEN, REFRESH_TOKEN, ROLE, USER_ID, USER_NAME];
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// User logged out explicitly
    Logout,
    /// Token refresh failed or a token was missing; caller must log in again
    LoginRequired,
}

/// Observable session lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedOut { reason: Option<SignOutReason> },
    SignedIn { role: Option<UserRole> },
}

/// Who is signed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub role: Option<UserRole>,
}

impl Identity {
    /// Fill fields the backend did not report from the access token's claims
    pub fn or_claims_of(self, access_token: &str) -> Self {
        let Ok(claims) = TokenClaims::peek(access_token) else {
            return self;
        };

        Self {
            user_id: self.user_id.or(claims.user_id),
            user_name: self.user_name.or(claims.user_name),
            role: self.role.or(claims.role),
        }
    }
}

/// Point-in-time copy of the stored session
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub identity: Identity,
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("identity", &self.identity)
            .finish()
    }
}

struct SessionInner {
    store: Arc<dyn KeyValueStore>,
    state_tx: watch::Sender<SessionState>,
    refresh_lock: Mutex<()>,
}

/// Cloneable handle to the session; all clones share the same state
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("snapshot", &self.snapshot()).finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let initial = match store.get(keys::ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            Some(_) => SessionState::SignedIn {
                role: store.get(keys::ROLE).and_then(|r| r.parse().ok()),
            },
            None => SessionState::SignedOut { reason: None },
        };
        let (state_tx, _) = watch::channel(initial);

        Self {
            inner: Arc::new(SessionInner {
                store,
                state_tx,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Session backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(keys::REFRESH_TOKEN)
    }

    pub fn role(&self) -> Option<UserRole> {
        self.get(keys::ROLE).and_then(|r| r.parse().ok())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.get(keys::USER_ID),
            user_name: self.get(keys::USER_NAME),
            role: self.role(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            access_token: self.access_token(),
            refresh_token: self.refresh_token(),
            identity: self.identity(),
        }
    }

    /// Replace the token pair (login or refresh)
    pub fn store_tokens(&self, pair: &TokenPair) {
        self.inner.store.set_many(&token_entries(pair));
        self.publish_signed_in();
    }

    pub fn set_role(&self, role: &UserRole) {
        self.inner.store.set(keys::ROLE, role.as_str());
        if self.is_authenticated() {
            self.publish_signed_in();
        }
    }

    /// Record who is signed in; `None` fields leave the stored value untouched
    pub fn set_identity(&self, identity: &Identity) {
        self.inner.store.set_many(&identity_entries(identity));
        if identity.role.is_some() && self.is_authenticated() {
            self.publish_signed_in();
        }
    }

    /// Start a new session, dropping whatever the previous user left behind
    ///
    /// Tokens and identity are written as one batch.
    pub fn sign_in(&self, pair: &TokenPair, identity: &Identity) {
        let mut entries = token_entries(pair);
        entries.extend(identity_entries(identity));

        self.inner.store.clear(keys::ALL);
        self.inner.store.set_many(&entries);
        self.publish_signed_in();
        tracing::info!(user_id = ?identity.user_id, role = ?identity.role, "Signed in");
    }

    /// Tear down the session
    pub fn clear(&self, reason: SignOutReason) {
        self.inner.store.clear(keys::ALL);
        tracing::info!(?reason, "Session cleared");
        self.inner
            .state_tx
            .send_replace(SessionState::SignedOut { reason: Some(reason) });
    }

    /// Watch sign-in/sign-out transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Serializes refresh attempts across every clone of this session
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.inner.refresh_lock.lock().await
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.store.get(key).filter(|v| !v.is_empty())
    }

    fn publish_signed_in(&self) {
        self.inner
            .state_tx
            .send_replace(SessionState::SignedIn { role: self.role() });
    }
}

fn token_entries(pair: &TokenPair) -> Vec<(&'static str, &str)> {
    let mut entries = vec![
        (keys::ACCESS_TOKEN, pair.access_token.as_str()),
        (keys::REFRESH_TOKEN, pair.refresh_token.as_str()),
    ];
    if let Some(role) = &pair.role {
        entries.push((keys::ROLE, role.as_str()));
    }
    entries
}

fn identity_entries(identity: &Identity) -> Vec<(&'static str, &str)> {
    let mut entries = Vec::new();
    if let Some(id) = &identity.user_id {
        entries.push((keys::USER_ID, id.as_str()));
    }
    if let Some(name) = &identity.user_name {
        entries.push((keys::USER_NAME, name.as_str()));
    }
    if let Some(role) = &identity.role {
        entries.push((keys::ROLE, role.as_str()));
    }
    entries
}
