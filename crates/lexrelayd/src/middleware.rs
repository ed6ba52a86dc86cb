//! Request middleware: fixed-window per-IP rate limiting.
//!
//! Over-limit requests are rejected before the pipeline runs. The window
//! and threshold come from [`crate::config::RateLimitConfig`].

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

struct Window {
    started: Instant,
    count: usize,
}

/// Fixed-window rate limiter, one window per client IP.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, Window>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Record one request for `peer`. Returns `false` when the peer has
    /// exhausted the current window.
    pub async fn check(&self, peer: &str) -> bool {
        let mut windows = self.windows.write().await;
        let now = Instant::now();

        let entry = windows.entry(peer.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            warn!(
                "Rate limit exceeded for {} ({}/{})",
                peer, entry.count, self.max_requests
            );
            return false;
        }

        entry.count += 1;
        true
    }

    /// Drop windows that have fully expired.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
    }

    /// Spawn a background task pruning expired windows once per window
    /// length, so the per-IP map does not grow with every distinct client
    /// ever seen. Must be called from within a tokio runtime.
    pub fn spawn_cleanup(&self) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.window);
            loop {
                ticker.tick().await;
                limiter.cleanup().await;
            }
        });
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let peer = extract_peer_addr(&request);

    if !limiter.check(&peer).await {
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(request).await)
}

/// Peer address: X-Forwarded-For first (proxies), then the connection's
/// remote address.
fn extract_peer_addr(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_enforced_within_window() {
        let limiter = RateLimiter::new(20, Duration::from_secs(60));

        for i in 1..=20 {
            assert!(
                limiter.check("127.0.0.1").await,
                "request {} should be allowed",
                i
            );
        }

        // 21st request in the same window is rejected
        assert!(!limiter.check("127.0.0.1").await);
    }

    #[tokio::test]
    async fn test_peers_are_independent() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));

        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check("10.0.0.1").await);
    }

    #[tokio::test]
    async fn test_spawned_cleanup_prunes_in_the_background() {
        let limiter = RateLimiter::new(5, Duration::from_millis(20));
        limiter.spawn_cleanup();

        for i in 0..3 {
            limiter.check(&format!("10.0.0.{}", i)).await;
        }

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(limiter.windows.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));

        for i in 0..3 {
            limiter.check(&format!("10.0.0.{}", i)).await;
        }
        assert_eq!(limiter.windows.read().await.len(), 3);

        tokio::time::sleep(Duration::from_millis(60)).await;
        limiter.cleanup().await;
        assert!(limiter.windows.read().await.is_empty());
    }
}
