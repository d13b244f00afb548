use crate::dtos::{iso_timestamp, ChatRequest, ChatResponse, ChatSubmission};
use crate::models::ChatRecord;
use crate::services::providers::YOGA_TRAINER_INSTRUCTION;
use crate::startup::AppState;
use crate::utils::JsonObject;
use axum::{extract::State, Json};
use chrono::Utc;
use service_core::error::AppError;

/// `POST /api/chat`: sanitize, generate, persist, respond.
///
/// The record is written only once the completion has succeeded.
pub async fn submit_chat(
    State(state): State<AppState>,
    JsonObject(body): JsonObject<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let submission = ChatSubmission::try_from(body)?;

    let answer = state
        .text_provider
        .complete(&submission.prompt, YOGA_TRAINER_INSTRUCTION)
        .await
        .map_err(|e| {
            tracing::error!(
                username = %submission.username,
                error = %e,
                "Chat completion failed"
            );
            if e.is_credential_error() {
                AppError::ConfigError(anyhow::Error::new(e))
                    .context("Invalid API key configuration.")
            } else {
                AppError::UpstreamError(anyhow::Error::new(e)).context("Error requesting AI bot.")
            }
        })?;

    let record = ChatRecord::new(submission.username, submission.prompt, answer);
    state
        .store
        .insert(&record)
        .await
        .map_err(|e| e.context("Error saving chat history."))?;

    tracing::info!(
        username = %record.username,
        prompt_len = record.question.chars().count(),
        answer_len = record.answer.chars().count(),
        "Chat answered"
    );

    Ok(Json(ChatResponse {
        status: "success",
        message: record.answer,
        timestamp: iso_timestamp(Utc::now()),
    }))
}
