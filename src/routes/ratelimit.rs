use crate::routes::errors::RateLimitedResponse;
use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, StatusCode};
use log::debug;
use quick_cache::sync::Cache;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const REAL_IP_HEADER: &str = "x-real-ip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: u32,
    pub per_minute: u32,
    /// Key clients by `X-Real-Ip`, only safe behind a proxy which overwrites it
    pub trust_real_ip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Window {
    Second,
    Minute,
}

impl Window {
    fn length_secs(&self) -> u64 {
        match self {
            Window::Second => 1,
            Window::Minute => 60,
        }
    }
}

/// Fixed window request counter per client ip
pub struct RateLimiter {
    limit: RateLimit,
    counters: Cache<(IpAddr, Window, u64), Arc<AtomicU32>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit, max_counters: usize) -> Self {
        RateLimiter {
            limit,
            counters: Cache::new(max_counters),
        }
    }

    /// Count a request from `ip`, returns false once any window is exhausted
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.check_at(ip, now)
    }

    pub fn client_ip(&self, headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
        match self.limit.trust_real_ip {
            true => real_ip_or_peer(headers, peer),
            false => peer.ip(),
        }
    }

    fn check_at(&self, ip: IpAddr, now_secs: u64) -> bool {
        let windows = [
            (Window::Second, self.limit.per_second),
            (Window::Minute, self.limit.per_minute),
        ];

        let mut allowed = true;
        for (window, limit) in windows {
            let key = (ip, window, now_secs / window.length_secs());
            let Ok(counter) = self
                .counters
                .get_or_insert_with(&key, || Ok::<_, Infallible>(Arc::new(AtomicU32::new(0))));
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if count > limit {
                allowed = false;
            }
        }
        allowed
    }
}

/// Client address as reported by the fronting proxy, falling back to the peer
fn real_ip_or_peer(headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
    headers
        .get(REAL_IP_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
        .unwrap_or(peer.ip())
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(request.headers(), peer);
    if !limiter.check(ip) {
        debug!("Rate limit exceeded for {}", ip);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitedResponse::default()),
        )
            .into_response();
    }
    next.run(request).await
}
