//! HTTP server assembly for lexrelayd.
//!
//! Builds the router out of the route modules, wires shared state, and
//! applies the middleware stack: rate limiting, CORS, body size limit,
//! request tracing.

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::extract::{DocumentExtractor, TextExtractor, MAX_ATTACHMENTS, MAX_FILE_BYTES};
use crate::middleware::{rate_limit_middleware, RateLimiter};
use crate::routes;
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, Router};
use lexrelay_common::CompletionClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared state handed to every request handler.
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
    pub extractor: Arc<dyn TextExtractor>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(client),
            extractor: Arc::new(DocumentExtractor),
            start_time: Instant::now(),
        }
    }
}

/// Build the full router with middleware applied.
pub fn router(state: Arc<AppState>) -> Router {
    let limiter = RateLimiter::new(
        state.config.server.rate_limit.max_requests,
        Duration::from_secs(state.config.server.rate_limit.window_secs),
    );
    limiter.spawn_cleanup();

    // Headroom over the raw file limits for multipart framing and text fields
    let body_limit = MAX_ATTACHMENTS * MAX_FILE_BYTES + 64 * 1024;

    Router::new()
        .merge(routes::ask_routes())
        .merge(routes::health_routes())
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .layer(cors_layer(&state.config.server.allowed_origins))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("[S]  Ignoring unparseable CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Bind and serve until the process is stopped.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("[S]  Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server terminated")?;

    Ok(())
}
