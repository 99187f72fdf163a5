//! HTTP API for the chat page

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::llm::LlmService;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub model_id: String,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmService>, session_idle: Duration) -> Self {
        let model_id = llm.model_id().to_string();
        Self {
            sessions: Arc::new(SessionStore::new(llm, session_idle)),
            model_id,
        }
    }
}
