use crate::error::ErrorEnvelope;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

#[derive(Debug, Clone, Copy)]
pub struct ErrorDetailPolicy {
    pub expose: bool,
}

/// Re-render error envelopes with their `error` detail when the policy allows it.
pub async fn error_detail_middleware(
    State(policy): State<ErrorDetailPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if !policy.expose {
        return response;
    }

    let envelope = match response.extensions().get::<ErrorEnvelope>() {
        Some(envelope) if envelope.detail.is_some() => envelope.clone(),
        _ => return response,
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, envelope.to_body(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    fn app(expose: bool) -> Router {
        Router::new()
            .route(
                "/boom",
                get(|| async {
                    Err::<(), _>(
                        AppError::UpstreamError(anyhow::anyhow!("quota exhausted"))
                            .context("Error requesting AI bot."),
                    )
                }),
            )
            .layer(from_fn_with_state(
                ErrorDetailPolicy { expose },
                error_detail_middleware,
            ))
    }

    async fn call(expose: bool) -> serde_json::Value {
        let response = app(expose)
            .oneshot(HttpRequest::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn detail_is_added_when_exposed() {
        let body = call(true).await;
        assert_eq!(body["message"], "Error requesting AI bot.");
        assert!(body["error"].as_str().unwrap().contains("quota exhausted"));
    }

    #[tokio::test]
    async fn detail_is_hidden_by_default() {
        let body = call(false).await;
        assert_eq!(body["message"], "Error requesting AI bot.");
        assert!(body.get("error").is_none());
    }
}
