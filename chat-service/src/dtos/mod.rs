//! Request and response shapes for the HTTP API.

use crate::models::ChatRecord;
use crate::utils::sanitize;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

/// Longest accepted prompt, in characters, after sanitization.
pub const MAX_PROMPT_CHARS: usize = 1000;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Both prompt and username are required and cannot be empty.";
pub const PROMPT_TOO_LONG_MESSAGE: &str =
    "Prompt is too long. Maximum 1000 characters allowed.";

/// Raw `POST /api/chat` body. Fields stay untyped until sanitized.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Value,
    #[serde(default)]
    pub username: Value,
}

/// A chat request that passed sanitization and bounds checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSubmission {
    pub prompt: String,
    pub username: String,
}

impl TryFrom<ChatRequest> for ChatSubmission {
    type Error = AppError;

    fn try_from(req: ChatRequest) -> Result<Self, Self::Error> {
        let prompt = sanitize(&req.prompt);
        let username = sanitize(&req.username);

        if prompt.is_empty() || username.is_empty() {
            return Err(AppError::ValidationError(MISSING_FIELDS_MESSAGE.to_string()));
        }

        // Measured in UTF-16 code units, so astral characters count twice.
        if prompt.encode_utf16().count() > MAX_PROMPT_CHARS {
            return Err(AppError::ValidationError(PROMPT_TOO_LONG_MESSAGE.to_string()));
        }

        Ok(Self { prompt, username })
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(rename = "Chat")]
    pub chat: Vec<ChatRecordResponse>,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatusResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRecordResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub question: String,
    pub answer: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<ChatRecord> for ChatRecordResponse {
    fn from(record: ChatRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            username: record.username,
            question: record.question,
            answer: record.answer,
            created_at: iso_timestamp(record.created_at),
        }
    }
}
