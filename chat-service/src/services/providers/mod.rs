//! Text completion providers.
//!
//! Handlers only see `TextProvider`, so the Gemini backend can be swapped
//! for the scripted mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Instruction sent with every prompt.
pub const YOGA_TRAINER_INSTRUCTION: &str = "You are a helpful Yoga Trainer. Answer the user's questions based on the provided prompt.Generate response of maximum 10 lines.";

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid API credentials: {0}")]
    InvalidCredentials(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Whether the failure stems from the API key rather than the request.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            ProviderError::NotConfigured(_) | ProviderError::InvalidCredentials(_)
        )
    }
}

/// Trait for single-shot text generation.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate an answer for `prompt` under `system_instruction`.
    async fn complete(&self, prompt: &str, system_instruction: &str)
        -> Result<String, ProviderError>;
}
