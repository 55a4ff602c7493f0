//! Per-address rate limiting.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chatvault_core::ratelimit::RateLimiter;
use tokio::task::JoinHandle;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(limiter) = &state.limiter else {
        return Ok(next.run(req).await);
    };

    let client = client_ip(
        req.headers(),
        peer,
        state.config.rate_limit.trust_forwarded_for,
    );

    if let Err(e) = limiter.check(client) {
        tracing::warn!(client = %client, retry_after = e.retry_after_secs, "rate limit exceeded");
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// The address a request is counted against.
///
/// Behind a trusted proxy the first `X-Forwarded-For` hop is the client;
/// anything unparsable falls back to the TCP peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> IpAddr {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    peer.ip()
}

/// Periodically drop elapsed windows so idle addresses don't accumulate.
pub fn spawn_window_pruner(limiter: Arc<RateLimiter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window());
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.prune();
            if removed > 0 {
                tracing::debug!(removed, tracked = limiter.tracked(), "pruned rate limit windows");
            }
        }
    })
}
