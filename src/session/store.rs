//! In-memory registry of live sessions

use super::ConversationSession;
use crate::llm::LlmService;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

struct Entry {
    session: Arc<ConversationSession>,
    last_access: Instant,
}

/// Live sessions keyed by id. Sessions end on delete, after sitting idle
/// longer than the store's limit, or on process exit.
pub struct SessionStore {
    llm: Arc<dyn LlmService>,
    max_idle: Duration,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new(llm: Arc<dyn LlmService>, max_idle: Duration) -> Self {
        Self {
            llm,
            max_idle,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session with an empty transcript
    pub async fn create(&self) -> (Uuid, Arc<ConversationSession>) {
        let id = Uuid::new_v4();
        let session = Arc::new(ConversationSession::new(self.llm.clone()));
        self.sessions.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_access: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "Session created");
        (id, session)
    }

    /// Look up a session and mark it as used
    pub async fn get(&self, id: &Uuid) -> Option<Arc<ConversationSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    /// End a session, returning whether it existed
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session ended");
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions not used since `now - max_idle`, returning how many went.
    ///
    /// An exchange already holding the session keeps it alive until it ends.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.last_access) <= self.max_idle;
            if !keep {
                tracing::info!(session_id = %id, "Session expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// Sweep idle sessions every `period` for the life of the process
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(Instant::now()).await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Idle sessions swept");
                }
            }
        })
    }
}
