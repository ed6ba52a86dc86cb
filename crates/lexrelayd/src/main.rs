//! lexrelayd entry point.

use anyhow::Result;
use lexrelay_common::HttpCompletionClient;
use lexrelayd::config::Config;
use lexrelayd::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("[S]  lexrelayd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    if config.upstream.api_key.is_none() {
        warn!(
            "[S]  No upstream API key configured ({} unset); /api/ask will return errors",
            lexrelayd::config::API_KEY_ENV
        );
    }

    let client = Arc::new(HttpCompletionClient::new(
        config.upstream.endpoint.clone(),
        config.upstream.api_key.clone(),
        config.upstream.timeout_secs,
    )?);

    let state = Arc::new(AppState::new(config, client));
    server::run(state).await
}
