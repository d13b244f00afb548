//! Application startup and lifecycle management.

use crate::config::ChatConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::{ChatStore, MongoChatStore, TextProvider};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    build_cors_layer, error_detail_middleware, origin_guard_middleware, request_id_middleware,
    security_headers_middleware, ErrorDetailPolicy, OriginPolicy, REQUEST_ID_HEADER,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfig,
    pub store: Arc<dyn ChatStore>,
    pub text_provider: Arc<dyn TextProvider>,
}

/// Global responder for handler panics.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    AppError::InternalError(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Build the HTTP router with every route and middleware layer.
pub fn build_router(state: AppState) -> Router {
    let origin_policy = Arc::new(OriginPolicy::new(&state.config.cors.allowed_origins));
    let cors_layer = build_cors_layer(&origin_policy);
    let detail_policy = ErrorDetailPolicy {
        expose: state.config.environment.exposes_error_details(),
    };
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/", get(handlers::service_status).fallback(handlers::route_not_found))
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::route_not_found),
        )
        .route(
            "/ready",
            get(handlers::readiness_check).fallback(handlers::route_not_found),
        )
        .route(
            "/api/chat",
            post(handlers::submit_chat).fallback(handlers::route_not_found),
        )
        .route(
            "/api/history/:user",
            get(handlers::get_history)
                .delete(handlers::delete_history)
                .fallback(handlers::route_not_found),
        )
        .fallback(handlers::route_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer)
        .layer(from_fn_with_state(origin_policy, origin_guard_middleware))
        .layer(from_fn_with_state(detail_policy, error_detail_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB, set up the Gemini provider and bind the listener.
    ///
    /// Any failure here aborts startup; there is no reconnect logic.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let store = MongoChatStore::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.mongodb.collection,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            e
        })?;

        store.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let gemini = GeminiTextProvider::new(GeminiConfig::from(&config.gemini)).map_err(|e| {
            tracing::error!("Failed to initialize Gemini provider: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        tracing::info!(model = %gemini.model(), "Initialized Gemini text provider");

        let state = AppState {
            config: config.clone(),
            store: Arc::new(store),
            text_provider: Arc::new(gemini),
        };

        Self::with_state(state).await
    }

    /// Bind a listener for an already assembled state.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            environment = %state.config.environment,
            "Chat service listening"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
