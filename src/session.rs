//! Per-session query persistence.
//!
//! The dashboard remembers the last submitted SQL per browser session so a
//! pagination-only request can re-run it. The orchestrator talks to an
//! explicit [`SessionState`] interface; the HTTP layer backs it with a
//! cookie-keyed in-memory [`SessionStore`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Read/write contract between the orchestrator and session storage.
///
/// Implementations must be `Send`: the HTTP layer holds a session across
/// the database await point.
pub trait SessionState: Send {
    /// Returns the SQL remembered from the prior submission, if any.
    fn last_query(&self) -> Option<String>;

    /// Overwrites the remembered SQL with the given text.
    fn remember_query(&mut self, sql: &str);
}

/// A standalone session holding state for a single logical user.
///
/// Used directly in tests; production requests go through [`StoreSession`].
#[derive(Debug, Default)]
pub struct MemorySession {
    last_query: Option<String>,
}

impl MemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionState for MemorySession {
    fn last_query(&self) -> Option<String> {
        self.last_query.clone()
    }

    fn remember_query(&mut self, sql: &str) {
        self.last_query = Some(sql.to_string());
    }
}

/// In-memory store of per-session state, keyed by session id.
///
/// Lives for the process lifetime; entries have no expiry of their own.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh session id.
    pub fn mint_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Returns the remembered SQL for the given session id.
    pub fn last_query(&self, session_id: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(session_id).cloned())
    }

    /// Overwrites the remembered SQL for the given session id.
    pub fn remember_query(&self, session_id: &str, sql: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(session_id.to_string(), sql.to_string());
        }
    }
}

/// A [`SessionState`] view of one session inside a shared [`SessionStore`].
pub struct StoreSession {
    store: Arc<SessionStore>,
    session_id: String,
}

impl StoreSession {
    /// Creates a view over the given session id.
    pub fn new(store: Arc<SessionStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }

    /// Returns the session id this view is bound to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl SessionState for StoreSession {
    fn last_query(&self) -> Option<String> {
        self.store.last_query(&self.session_id)
    }

    fn remember_query(&mut self, sql: &str) {
        self.store.remember_query(&self.session_id, sql);
    }
}
