use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID for the current request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct FetchWindow {
    opened_at: Instant,
    used: usize,
}

/// Caps inbound fetches per fixed window.
///
/// Each fetch can cost several upstream calls plus minutes of cool-down, so
/// bursts are turned away here before they reach the upstream.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_fetches: usize,
    window: Duration,
    current: Arc<Mutex<FetchWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_fetches: usize, window: Duration) -> Self {
        Self {
            max_fetches,
            window,
            current: Arc::new(Mutex::new(FetchWindow {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(max_fetches: usize) -> Self {
        Self::new(max_fetches, Duration::from_secs(60))
    }

    /// Takes one slot, or returns how long until the window reopens.
    async fn acquire(&self) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let elapsed = current.opened_at.elapsed();
        if elapsed >= self.window {
            current.opened_at = Instant::now();
            current.used = 0;
        }
        if current.used >= self.max_fetches {
            return Err(self.window.saturating_sub(current.opened_at.elapsed()));
        }
        current.used += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RejectionBody {
    error: Rejection,
}

#[derive(Debug, Serialize)]
struct Rejection {
    code: &'static str,
    message: &'static str,
}

/// Uses the caller's `x-request-id` or mints a `UUIDv4`, exposes it to
/// handlers as [`RequestId`] and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(X_REQUEST_ID, val);
    }
    res
}

/// Rejects fetches beyond the window's budget with 429 and `Retry-After`.
pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match limit.acquire().await {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = wait.as_secs().max(1);
            tracing::warn!(
                max_fetches = limit.max_fetches,
                retry_after_secs = retry_after,
                path = %req.uri().path(),
                "inbound fetch rate limit exceeded"
            );
            let mut res = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(RejectionBody {
                    error: Rejection {
                        code: "rate_limited",
                        message: "too many fetches, try again shortly",
                    },
                }),
            )
                .into_response();
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            res
        }
    }
}
