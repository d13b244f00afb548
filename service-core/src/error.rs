use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("Upstream error: {0:#}")]
    UpstreamError(anyhow::Error),

    #[error("Database error: {0:#}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0:#}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0:#}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap the underlying cause with a client-facing message.
    ///
    /// The outermost context of an `anyhow` chain is what clients see; the
    /// full chain is kept as detail.
    pub fn context(self, message: &'static str) -> Self {
        match self {
            AppError::UpstreamError(err) => AppError::UpstreamError(err.context(message)),
            AppError::DatabaseError(err) => AppError::DatabaseError(err.context(message)),
            AppError::ConfigError(err) => AppError::ConfigError(err.context(message)),
            AppError::InternalError(err) => AppError::InternalError(err.context(message)),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            AppError::UpstreamError(_)
            | AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        let (message, detail) = match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => (msg.clone(), None),
            AppError::PayloadTooLarge => ("Request body too large.".to_string(), None),
            AppError::RouteNotFound => ("Route not found".to_string(), None),
            AppError::OriginNotAllowed(_) => ("Not allowed by CORS".to_string(), None),
            // Credentials problems never echo their cause.
            AppError::ConfigError(err) => (err.to_string(), None),
            AppError::UpstreamError(err) | AppError::DatabaseError(err) => {
                (err.to_string(), Some(format!("{:#}", err)))
            }
            AppError::InternalError(err) => (
                "Internal server error".to_string(),
                Some(format!("{:#}", err)),
            ),
        };

        ErrorEnvelope { message, detail }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Client-facing error payload.
///
/// Stored as a response extension so that `error_detail_middleware` can
/// re-render the body with `detail` attached in development.
#[derive(Debug, Clone)]
pub struct ErrorEnvelope {
    pub message: String,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ErrorEnvelope {
    pub fn to_body(&self, include_detail: bool) -> Body {
        let body = ErrorBody {
            status: "error",
            message: &self.message,
            error: if include_detail {
                self.detail.as_deref()
            } else {
                None
            },
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => Body::from(bytes),
            Err(_) => Body::from(r#"{"status":"error","message":"Internal server error"}"#),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = self.envelope();

        let mut res = (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            envelope.to_body(false),
        )
            .into_response();

        res.extensions_mut().insert(envelope);
        res
    }
}
