#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chat_service::config::ChatConfig;
use chat_service::models::ChatRecord;
use chat_service::services::providers::mock::MockTextProvider;
use chat_service::services::{ChatStore, InMemoryChatStore};
use chat_service::{build_router, AppState};
use serde_json::Value;
use service_core::error::AppError;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const HOST: &str = "localhost:8080";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryChatStore>,
    pub provider: Arc<MockTextProvider>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config() -> ChatConfig {
    ChatConfig::for_tests(vec![ALLOWED_ORIGIN.to_string()])
}

pub fn spawn_app(provider: MockTextProvider) -> TestApp {
    spawn_app_with(test_config(), provider)
}

pub fn spawn_app_with(config: ChatConfig, provider: MockTextProvider) -> TestApp {
    let store = Arc::new(InMemoryChatStore::new());
    let provider = Arc::new(provider);

    let state = AppState {
        config,
        store: store.clone(),
        text_provider: provider.clone(),
    };

    TestApp {
        router: build_router(state),
        store,
        provider,
    }
}

/// Router backed by a store whose every operation fails.
pub fn spawn_app_with_failing_store(provider: MockTextProvider) -> Router {
    failing_store_router(test_config(), provider)
}

pub fn failing_store_router(config: ChatConfig, provider: MockTextProvider) -> Router {
    let state = AppState {
        config,
        store: Arc::new(FailingStore),
        text_provider: Arc::new(provider),
    };
    build_router(state)
}

pub struct FailingStore;

#[async_trait]
impl ChatStore for FailingStore {
    async fn insert(&self, _record: &ChatRecord) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn find_by_username(&self, _username: &str) -> Result<Vec<ChatRecord>, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn delete_by_username(&self, _username: &str) -> Result<u64, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_chat(router: &Router, body: Value) -> TestResponse {
    send(router, json_request(Method::POST, "/api/chat", &body)).await
}
