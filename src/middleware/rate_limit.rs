use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window shared by every route the layer is attached to.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    label: &'static str,
    rps: u32,
    window: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    pub fn per_second(label: &'static str, rps: u32) -> Self {
        Self {
            label,
            rps: rps.max(1),
            window: Arc::new(Mutex::new(WindowState {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut guard = self.window.lock().unwrap_or_else(|e| e.into_inner());
        if now.duration_since(guard.start) >= WINDOW {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.rps {
            guard.count += 1;
            true
        } else {
            false
        }
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow_at(Instant::now()) {
        tracing::warn!(group = limiter.label, rps = limiter.rps, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "success": false, "error": "rate_limit_exceeded" })),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_caps_requests_and_then_resets() {
        let limiter = RateLimiter::per_second("test", 2);
        let start = Instant::now();
        assert!(limiter.allow_at(start));
        assert!(limiter.allow_at(start));
        assert!(!limiter.allow_at(start + Duration::from_millis(500)));
        assert!(limiter.allow_at(start + Duration::from_millis(1200)));
    }

    #[test]
    fn zero_rps_still_lets_one_through() {
        let limiter = RateLimiter::per_second("test", 0);
        let now = Instant::now();
        assert!(limiter.allow_at(now));
        assert!(!limiter.allow_at(now));
    }
}
