//! Session registry - ephemeral per-login state
//!
//! One entry per logged-in user: the authenticated username plus a
//! cached copy of the balance for display. Sessions live only in this
//! map; nothing here is ever persisted. A user is logged in exactly
//! while their token resolves, logout removes the entry.

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Display cache; the stored balance stays authoritative and the
    /// cache is refreshed from each ledger result.
    pub balance: i64,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// LoggedOut -> LoggedIn: mint a bearer token for an authenticated
    /// user.
    pub fn open(&self, username: impl Into<String>, balance: i64) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions.insert(
            token,
            Session {
                username: username.into(),
                balance,
            },
        );
        token
    }

    pub fn get(&self, token: &Uuid) -> Option<Session> {
        self.sessions.get(token).map(|s| s.clone())
    }

    /// Refresh the cached balance after a ledger mutation. A stale token
    /// is a no-op (the session may have been logged out concurrently).
    pub fn update_balance(&self, token: &Uuid, balance: i64) {
        if let Some(mut session) = self.sessions.get_mut(token) {
            session.balance = balance;
        }
    }

    /// LoggedIn -> LoggedOut. Returns false if the token was not live.
    pub fn close(&self, token: &Uuid) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
