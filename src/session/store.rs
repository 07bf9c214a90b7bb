//! In-memory session registry.
//!
//! Sessions idle for longer than the configured TTL are evicted by a
//! background sweep (see [`SessionStore::spawn_sweeper`]). A session whose
//! handle is still held, e.g. by a running chat turn, is never evicted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::SessionState;

/// Shared handle to one session's state.
///
/// The lock is held for a whole chat turn, so a second submit from the same
/// session waits for the first reply instead of racing it.
pub type SessionHandle = Arc<Mutex<SessionState>>;

#[derive(Debug)]
struct SessionEntry {
    handle: SessionHandle,
    last_access: Instant,
}

/// Map of live sessions keyed by id. Lost on restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionEntry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session in its initial state.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionEntry {
                handle: Arc::new(Mutex::new(SessionState::new())),
                last_access: Instant::now(),
            },
        );
        tracing::info!(session = %id, "session created");
        id
    }

    /// Look up a session and mark it as accessed.
    pub fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        // Clone the Arc out so the shard guard is released before the caller
        // awaits the session lock.
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_access = Instant::now();
            Arc::clone(&entry.handle)
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions not accessed within `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            entry.last_access.elapsed() < ttl || Arc::strong_count(&entry.handle) > 1
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) periodically until the store is dropped.
    ///
    /// The sweep runs every `ttl / 2`, bounded to between one second and one minute.
    pub fn spawn_sweeper(self: &Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let period = (ttl / 2).clamp(Duration::from_secs(1), Duration::from_secs(60));
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else { break };
                store.evict_idle(ttl);
            }
        })
    }
}
