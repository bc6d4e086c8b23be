use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::forecast::ForecastSession;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Session limit of {0} reached")]
    LimitReached(usize),
}

pub type SharedSession = Arc<Mutex<ForecastSession>>;

struct SessionEntry {
    session: SharedSession,
    last_used: parking_lot::Mutex<Instant>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(ForecastSession::new())),
            last_used: parking_lot::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_used.lock() = Instant::now();
    }

    /// Idle for at least `ttl` and not held by a request
    fn is_expired(&self, ttl: Duration) -> bool {
        Arc::strong_count(&self.session) == 1 && self.last_used.lock().elapsed() >= ttl
    }
}

/// Open forecast sessions keyed by id.
///
/// Each session sits behind its own async mutex so runs on one session are
/// serialised while different sessions proceed in parallel. Sessions idle
/// for longer than `idle_ttl` are evicted when the registry is full.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Result<Uuid, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            let before = sessions.len();
            sessions.retain(|_, entry| !entry.is_expired(self.idle_ttl));
            debug!(evicted = before - sessions.len(), "idle sessions evicted");
        }
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached(self.max_sessions));
        }
        let id = Uuid::new_v4();
        sessions.insert(id, SessionEntry::new());
        info!(session_id = %id, open = sessions.len(), "session created");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, SessionError> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        entry.touch();
        Ok(entry.session.clone())
    }

    /// Close a session. A run in flight keeps its own handle and finishes
    /// against the detached session.
    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        info!(session_id = %id, open = sessions.len(), "session closed");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
