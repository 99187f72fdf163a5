//! Conversation sessions
//!
//! A session owns one transcript and mediates every exchange with the model
//! service. Transcripts live in memory only.

mod store;

pub use store::SessionStore;

use crate::llm::{start_chat, GenerationParams, LlmError, LlmMessage, LlmService, MessageRole};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: MessageRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

impl From<&Turn> for LlmMessage {
    fn from(turn: &Turn) -> Self {
        LlmMessage {
            role: turn.role,
            text: turn.text.clone(),
        }
    }
}

/// Label the page uses for a role tag: replies tagged `"model"` render as
/// `"assistant"`, everything else unchanged
pub fn translate_role(tag: &str) -> &str {
    if tag == "model" {
        "assistant"
    } else {
        tag
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    ExternalService(#[from] LlmError),
}

pub struct ConversationSession {
    llm: Arc<dyn LlmService>,
    transcript: RwLock<Vec<Turn>>,
    /// Held for a whole exchange so submissions never interleave
    exchange: Mutex<()>,
}

impl ConversationSession {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            transcript: RwLock::new(Vec::new()),
            exchange: Mutex::new(()),
        }
    }

    /// Append `user_text` as a user turn and obtain the assistant's reply.
    ///
    /// The user turn stays in the transcript when the model call fails.
    pub async fn append_and_generate(
        &self,
        user_text: &str,
        params: GenerationParams,
    ) -> Result<Turn, SessionError> {
        let _exchange = self.exchange.lock().await;

        let history: Vec<LlmMessage> = {
            let mut transcript = self.transcript.write().await;
            let history = transcript.iter().map(LlmMessage::from).collect();
            transcript.push(Turn::user(user_text));
            history
        };

        let response = start_chat(self.llm.clone(), history)
            .send(user_text, params)
            .await?;

        let turn = Turn::assistant(response.text);
        self.transcript.write().await.push(turn.clone());
        Ok(turn)
    }

    /// Committed turns in chronological order
    pub async fn history(&self) -> Vec<Turn> {
        self.transcript.read().await.clone()
    }
}
