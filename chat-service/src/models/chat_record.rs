//! A persisted question/answer exchange.

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};

/// One prompt and the answer generated for it.
///
/// Records are written only after the completion succeeds and are never
/// updated; they are removed in bulk per username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Sanitized requester name. Not unique.
    pub username: String,

    /// Sanitized prompt.
    pub question: String,

    /// Completion text, stored as returned.
    pub answer: String,

    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    pub fn new(username: String, question: String, answer: String) -> Self {
        Self {
            id: ObjectId::new(),
            username,
            question,
            answer,
            created_at: Utc::now(),
        }
    }
}
