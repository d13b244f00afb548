use crate::dtos::{HistoryResponse, MessageResponse};
use crate::startup::AppState;
use crate::utils::PathParam;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// `GET /api/history/:user`. The username is matched verbatim and results keep
/// store order.
pub async fn get_history(
    State(state): State<AppState>,
    PathParam(username): PathParam,
) -> Result<Json<HistoryResponse>, AppError> {
    let records = state
        .store
        .find_by_username(&username)
        .await
        .map_err(|e| e.context("Error in finding chat."))?;

    tracing::debug!(username = %username, count = records.len(), "Fetched chat history");

    Ok(Json(HistoryResponse {
        status: "success",
        message: "Chats found",
        chat: records.into_iter().map(Into::into).collect(),
    }))
}

/// `DELETE /api/history/:user`. Deleting nothing is a 404.
pub async fn delete_history(
    State(state): State<AppState>,
    PathParam(username): PathParam,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state
        .store
        .delete_by_username(&username)
        .await
        .map_err(|e| e.context("Error in deleting history."))?;

    if deleted == 0 {
        return Err(AppError::NotFound(
            "No chat history found for the specified user.".to_string(),
        ));
    }

    tracing::info!(username = %username, deleted, "Deleted chat history");

    Ok(Json(MessageResponse {
        status: "success",
        message: "Chat history deleted successfully.",
    }))
}
