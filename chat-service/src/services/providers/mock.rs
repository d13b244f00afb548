//! Mock provider implementation for testing.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// A prompt/instruction pair the mock was asked to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_instruction: String,
}

enum Behavior {
    Echo,
    Reply(String),
    Fail(ProviderError),
    Panic,
}

/// Mock text provider for testing.
pub struct MockTextProvider {
    behavior: Behavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTextProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers `Mock response for: <prompt>`.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    pub fn replying(answer: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(answer.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    /// Panics inside the handler; exercises the panic responder.
    pub fn panicking() -> Self {
        Self::with_behavior(Behavior::Panic)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
    ) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                system_instruction: system_instruction.to_string(),
            });
        }

        match &self.behavior {
            Behavior::Echo => Ok(format!("Mock response for: {}", prompt)),
            Behavior::Reply(answer) => Ok(answer.clone()),
            Behavior::Fail(error) => Err(error.clone()),
            Behavior::Panic => panic!("mock provider panicked"),
        }
    }
}
