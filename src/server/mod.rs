//! REST API over the document store

mod handlers;
mod page;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::core::config::ServerConfig;
use crate::store::{DocumentStore, SqliteStore};

/// Shared, cheaply cloneable request state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Include error details in 500 bodies
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, expose_errors: bool) -> Self {
        Self {
            store,
            expose_errors,
        }
    }
}

pub fn build_router(state: AppState, allowed_origin: &str) -> Router {
    let cors = match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!("Ignoring invalid allowed origin {:?}: {}", allowed_origin, e);
            CorsLayer::new()
        }
    };

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/site", get(page::site_page_handler))
        .route("/api/health", get(handlers::health_handler))
        .route(
            "/api/components",
            get(handlers::get_components_handler)
                .post(handlers::save_components_handler)
                .delete(handlers::reset_components_handler),
        )
        .fallback(handlers::not_found_handler)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "message": "Internal server error" })),
    )
        .into_response()
}

/// Open the database and serve until Ctrl+C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.display()))?;
    tracing::info!("Using database {}", config.database.display());

    let state = AppState::new(Arc::new(store), config.expose_errors());
    let app = build_router(state, &config.allowed_origin);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")
}
