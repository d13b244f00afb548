use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::AppError;

/// JSON body extractor that only accepts an object and reports every
/// rejection through the service's error envelope.
pub struct JsonObject<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonObject<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(reject)?;

        if !value.is_object() {
            return Err(AppError::ValidationError(
                "Request body must be a JSON object.".to_string(),
            ));
        }

        let parsed = serde_json::from_value(value).map_err(|e| {
            AppError::ValidationError(format!("Invalid request body: {}", e))
        })?;

        Ok(JsonObject(parsed))
    }
}

fn reject(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::ValidationError(format!("Invalid JSON body: {}", rejection.body_text()))
}

/// Single path parameter extractor that reports rejections (for example a
/// segment that is not valid UTF-8 once decoded) through the error envelope.
pub struct PathParam(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for PathParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::ValidationError(format!(
                    "Invalid path parameter: {}",
                    rejection.body_text()
                ))
            })?;

        Ok(PathParam(value))
    }
}
