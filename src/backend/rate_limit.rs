//! Fixed-Window Rate Limiter
//!
//! Each key (client address or API key prefix) gets a counter that resets
//! when its window elapses. Requests over the limit are rejected and not
//! counted. Applied as middleware to the auth and external API routes.
//!
//! The client address is the peer address from `ConnectInfo`. A first
//! `X-Forwarded-For` hop is only used when `trust_proxy_headers` is set, and
//! only if it parses as an IP address.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

use crate::backend::error::BackendError;
use crate::backend::server::config::RateLimitConfig;
use crate::shared::api_key::parse_key_prefix;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window ends
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            window: config.window,
            max_requests: config.max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock();
        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        let reset_after = self.window.saturating_sub(now.duration_since(window.started));
        if window.count >= self.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - window.count,
            reset_after,
        }
    }

    /// Drop windows that have ended
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}

/// The two limiters the router installs
#[derive(Debug, Clone)]
pub struct RateLimiters {
    pub auth: Arc<FixedWindowLimiter>,
    pub api: Arc<FixedWindowLimiter>,
    trust_proxy_headers: bool,
}

impl RateLimiters {
    pub fn new(auth: RateLimitConfig, api: RateLimitConfig, trust_proxy_headers: bool) -> Self {
        Self {
            auth: Arc::new(FixedWindowLimiter::new(auth)),
            api: Arc::new(FixedWindowLimiter::new(api)),
            trust_proxy_headers,
        }
    }

    pub fn prune(&self) {
        let removed = self.auth.prune() + self.api.prune();
        if removed > 0 {
            tracing::debug!("pruned {} rate limit windows", removed);
        }
    }
}

fn enforce(limiter: &FixedWindowLimiter, key: &str) -> Result<u32, BackendError> {
    let decision = limiter.check(key);
    if decision.allowed {
        Ok(decision.remaining)
    } else {
        tracing::warn!("rate limit exceeded for {}", key);
        Err(BackendError::RateLimited {
            retry_after: decision.reset_after.as_secs().max(1),
        })
    }
}

fn with_remaining(mut response: Response, remaining: u32) -> Response {
    response
        .headers_mut()
        .insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    response
}

/// First `X-Forwarded-For` hop, when it is a well-formed IP address
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() || first.len() > 64 {
        return None;
    }
    first.parse().ok()
}

fn client_key(request: &Request, trust_proxy_headers: bool) -> String {
    let forwarded = if trust_proxy_headers {
        forwarded_for(request.headers())
    } else {
        None
    };

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn api_key_of(request: &Request) -> Option<String> {
    let headers = request.headers();
    let raw = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })?;
    parse_key_prefix(raw.trim()).map(str::to_string)
}

/// Limit signup/login by client address
pub async fn auth_rate_limit(
    State(limiters): State<RateLimiters>,
    request: Request,
    next: Next,
) -> Response {
    let key = format!("auth:{}", client_key(&request, limiters.trust_proxy_headers));
    match enforce(&limiters.auth, &key) {
        Ok(remaining) => with_remaining(next.run(request).await, remaining),
        Err(e) => with_remaining(e.into_response(), 0),
    }
}

/// Limit the external API by key prefix, falling back to client address
pub async fn api_rate_limit(
    State(limiters): State<RateLimiters>,
    request: Request,
    next: Next,
) -> Response {
    let key = match api_key_of(&request) {
        Some(prefix) => format!("key:{}", prefix),
        None => format!("ip:{}", client_key(&request, limiters.trust_proxy_headers)),
    };
    match enforce(&limiters.api, &key) {
        Ok(remaining) => with_remaining(next.run(request).await, remaining),
        Err(e) => with_remaining(e.into_response(), 0),
    }
}
