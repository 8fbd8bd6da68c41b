//! Per-session attribute store
//!
//! Stands in for the servlet container's session: remember-me fixtures stash
//! the minted token under the cookie name, keyed by the caller's session id,
//! and compare it on later requests by exact string equality. Entries are
//! never expired by this code.

use dashmap::DashMap;
use uuid::Uuid;

/// Cookie carrying the session id; minted on first contact.
pub const SESSION_COOKIE: &str = "BENCHSESSIONID";

/// Concurrent session-attribute store keyed by (session id, attribute name).
#[derive(Debug, Default)]
pub struct SessionStore {
    attributes: DashMap<(String, String), String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an attribute for a session.
    pub fn get(&self, session_id: &str, name: &str) -> Option<String> {
        self.attributes
            .get(&(session_id.to_string(), name.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Store an attribute for a session, replacing any previous value.
    pub fn put(&self, session_id: &str, name: &str, value: String) {
        self.attributes
            .insert((session_id.to_string(), name.to_string()), value);
    }

    /// Number of stored attributes across all sessions.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Mint a fresh session id.
pub fn mint_session_id() -> String {
    Uuid::new_v4().to_string()
}
