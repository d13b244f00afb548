//! Cross-origin policy.
//!
//! `tower_http`'s `CorsLayer` only decorates responses; it never refuses a
//! request. `origin_guard_middleware` sits in front of it and turns away
//! foreign origins before any handler runs.

use crate::error::AppError;
use crate::middleware::request_id::REQUEST_ID_HEADER;
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: HashSet<String>,
}

impl OriginPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .map(|o| normalize(o.as_ref()))
            .filter(|o| !o.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// An origin passes if it is allow-listed or names the host being called.
    pub fn permits(&self, origin: &str, host: Option<&str>) -> bool {
        let origin = normalize(origin);
        if self.allowed.contains(&origin) {
            return true;
        }

        match (host, origin.split_once("://")) {
            (Some(host), Some((_, authority))) => authority.eq_ignore_ascii_case(host.trim()),
            _ => false,
        }
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

pub async fn origin_guard_middleware(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(origin) = req.headers().get(header::ORIGIN) else {
        return next.run(req).await;
    };

    let origin = match origin.to_str() {
        Ok(origin) => origin.to_string(),
        Err(_) => return AppError::OriginNotAllowed("<invalid>".to_string()).into_response(),
    };

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()));

    if policy.permits(&origin, host.as_deref()) {
        next.run(req).await
    } else {
        tracing::warn!(origin = %origin, "Rejected request from disallowed origin");
        AppError::OriginNotAllowed(origin).into_response()
    }
}

/// Response headers and preflight handling for allow-listed origins.
pub fn build_cors_layer(policy: &OriginPolicy) -> CorsLayer {
    let origins: Vec<HeaderValue> = policy
        .origins()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
}
