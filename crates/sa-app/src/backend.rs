pub mod routes;
pub mod schemas;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};
use crate::backend::routes::api_routes;
use crate::backend::schemas::MessageResponse;
use crate::backend::state::AppState;

/// Seed images arrive as multipart uploads
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub const BANNER: &str = "AI Shorts Automation Backend API";

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(banner))
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    if origins.is_empty() {
        debug!("CORS: allowing any origin");
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    debug!(?origins, "CORS: allowed origins");
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn banner() -> Json<MessageResponse> {
    Json(MessageResponse::new(BANNER))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Serve on an already bound listener until the process stops
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("server failed")
}

pub async fn run(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!("Starting backend server on port {}", port);
    serve(listener, state).await
}
