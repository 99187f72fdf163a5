//! Common types for LLM interactions

use std::ops::RangeInclusive;
use thiserror::Error;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Role tag used by the model service (`"model"` for replies)
    pub fn wire_tag(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub text: String,
}

impl LlmMessage {
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

/// Sampling controls sent with each generation request.
///
/// Only constructible through [`GenerationParams::new`], so every instance
/// handed to a model service is within the widget bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    temperature: f32,
    max_output_tokens: u32,
}

impl GenerationParams {
    pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const TEMPERATURE_STEP: f32 = 0.1;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    pub const MAX_OUTPUT_TOKENS_RANGE: RangeInclusive<u32> = 50..=1000;
    pub const MAX_OUTPUT_TOKENS_STEP: u32 = 50;
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 250;

    pub fn new(temperature: f32, max_output_tokens: u32) -> Result<Self, ParamError> {
        // NaN fails `contains`
        if !Self::TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ParamError::Temperature(temperature));
        }
        if !Self::MAX_OUTPUT_TOKENS_RANGE.contains(&max_output_tokens) {
            return Err(ParamError::MaxOutputTokens(max_output_tokens));
        }
        Ok(Self {
            temperature,
            max_output_tokens,
        })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: Self::DEFAULT_TEMPERATURE,
            max_output_tokens: Self::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Generation parameter outside the accepted range
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParamError {
    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    Temperature(f32),
    #[error("max_output_tokens must be between 50 and 1000, got {0}")]
    MaxOutputTokens(u32),
}

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
    pub params: GenerationParams,
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
