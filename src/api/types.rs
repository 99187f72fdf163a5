//! API request and response types

use crate::cosmos::CosmicDecor;
use crate::session::{translate_role, Turn};
use serde::{Deserialize, Serialize};

/// Request to send a chat message. Omitted parameters take the widget defaults.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// A turn as the page renders it
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TurnView {
    pub role: String,
    pub text: String,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: translate_role(turn.role.wire_tag()).to_string(),
            text: turn.text.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<TurnView>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub turn: TurnView,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Bounds, steps and defaults for one slider
#[derive(Debug, Serialize)]
pub struct Control<T> {
    pub min: T,
    pub max: T,
    pub step: T,
    pub default: T,
}

#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub temperature: Control<f32>,
    pub max_output_tokens: Control<u32>,
}

#[derive(Debug, Serialize)]
pub struct CosmosResponse {
    pub space_fact: &'static str,
    #[serde(flatten)]
    pub decor: CosmicDecor,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub active_sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
