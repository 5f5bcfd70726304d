use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::i18n::Locale;
use crate::state::AppState;

const TRACING_TARGET_RATELIMIT: &str = "msaada_backend::middleware::ratelimit";

/// Stale windows are swept once the table grows past this many clients.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the window starts over.
    pub reset_after: u64,
}

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: RwLock<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs.max(1)),
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitDecision {
        let mut clients = self.clients.write().await;

        if clients.len() > PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = clients.entry(ip).or_insert(Window { started: now, count: 0 });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window { started: now, count: 0 };
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs()
            .max(1);

        if entry.count >= self.max_requests {
            return RateLimitDecision { allowed: false, remaining: 0, reset_after };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - entry.count,
            reset_after,
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.clients.read().await.len()
    }
}

fn header_value(value: impl std::fmt::Display) -> HeaderValue {
    HeaderValue::try_from(value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

/// Rejects clients that used up their window with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    locale: Locale,
    req: Request,
    next: Next,
) -> Response {
    let Some(ip) = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        return next.run(req).await;
    };

    let limiter = &state.limiter;
    let decision = limiter.check(ip).await;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(target: TRACING_TARGET_RATELIMIT, %ip, "rate limit exceeded");
        let mut response = ApiError::too_many_requests(locale.err_many_request.clone()).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, header_value(decision.reset_after));
        response
    };

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", header_value(limiter.max_requests()));
    headers.insert("X-RateLimit-Remaining", header_value(decision.remaining));
    headers.insert("X-RateLimit-Reset", header_value(decision.reset_after));
    response
}
