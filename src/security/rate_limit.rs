//! Partitioned fixed-window admission control.
//!
//! Every request is counted against a partition: the authenticated caller's
//! name when a verified token is present, otherwise the `Host` header.
//! Each partition owns one `{count, window_start}` pair. When the window
//! elapses the pair is reset, so a burst straddling a boundary may see up to
//! twice the permit limit admitted.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::auth::CallerIdentity;
use crate::config::RateLimitConfig;
use crate::http::response::RateLimitRejection;
use crate::observability::metrics;

/// Limiter parameters, normalized from [`RateLimitConfig`].
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub permit_limit: u32,
    pub window: Duration,
    /// Lower-cased documentation prefixes.
    pub exempt_prefixes: Vec<String>,
    pub idle_windows: u32,
}

impl From<&RateLimitConfig> for RateLimitSettings {
    fn from(config: &RateLimitConfig) -> Self {
        Self::new(
            config.permit_limit,
            Duration::from_millis(config.window_ms),
            config.exempt_prefixes.iter().map(String::as_str),
        )
        .with_idle_windows(config.idle_windows)
    }
}

impl RateLimitSettings {
    pub fn new<'a>(
        permit_limit: u32,
        window: Duration,
        exempt_prefixes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            permit_limit,
            window,
            exempt_prefixes: exempt_prefixes
                .into_iter()
                .map(str::to_lowercase)
                .collect(),
            idle_windows: 10,
        }
    }

    pub fn with_idle_windows(mut self, idle_windows: u32) -> Self {
        self.idle_windows = idle_windows.max(1);
        self
    }
}

struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Read-only copy of a partition's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub count: u32,
    pub window_start: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Documentation path; no quota consumed.
    Exempt,
    /// Within quota. `remaining` permits are left in the current window.
    Admitted { remaining: u32 },
    /// Quota exhausted. `retry_after` is `None` when the window is already
    /// at its boundary and no precise hint can be given.
    Rejected { retry_after: Option<Duration> },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected { .. })
    }
}

/// Fixed-window rate limiter keyed by partition.
pub struct FixedWindowLimiter {
    windows: DashMap<String, WindowState>,
    settings: RateLimitSettings,
    last_sweep: Mutex<Instant>,
}

impl FixedWindowLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            windows: DashMap::new(),
            settings,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// True when `path` falls under a documentation prefix.
    pub fn is_exempt(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.settings
            .exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Check a request against its partition using the current time.
    pub fn check(&self, path: &str, key: &str) -> Admission {
        self.check_at(path, key, Instant::now())
    }

    /// Check a request against its partition at `now`.
    pub fn check_at(&self, path: &str, key: &str, now: Instant) -> Admission {
        if self.is_exempt(path) {
            return Admission::Exempt;
        }

        let limit = self.settings.permit_limit;
        let window = self.settings.window;

        // The entry guard holds the shard write lock, so the rollover,
        // comparison and increment below are one atomic step per key.
        let admission = {
            let mut state = self
                .windows
                .entry(key.to_string())
                .or_insert_with(|| WindowState {
                    count: 0,
                    window_start: now,
                });

            if now.saturating_duration_since(state.window_start) >= window {
                state.count = 0;
                state.window_start = now;
            }

            if state.count < limit {
                state.count += 1;
                Admission::Admitted {
                    remaining: limit - state.count,
                }
            } else {
                let retry_after = state
                    .window_start
                    .checked_add(window)
                    .map(|reset_at| reset_at.saturating_duration_since(now))
                    .filter(|wait| !wait.is_zero());
                Admission::Rejected { retry_after }
            }
        };

        self.maybe_evict(now);
        admission
    }

    /// Current window for `key`, if the partition exists.
    pub fn window_state(&self, key: &str) -> Option<WindowSnapshot> {
        self.windows.get(key).map(|state| WindowSnapshot {
            count: state.count,
            window_start: state.window_start,
        })
    }

    /// Number of tracked partitions.
    pub fn partitions(&self) -> usize {
        self.windows.len()
    }

    fn idle_after(&self) -> Duration {
        self.settings.window.saturating_mul(self.settings.idle_windows)
    }

    /// Drop partitions whose window started more than `idle_windows`
    /// windows before `now`. Returns how many were removed.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let idle_after = self.idle_after();
        let mut removed = 0;
        self.windows.retain(|_, state| {
            let keep = now.saturating_duration_since(state.window_start) < idle_after;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Sweep at most once per idle period, and only from one caller at a time.
    fn maybe_evict(&self, now: Instant) {
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last_sweep) < self.idle_after() {
            return;
        }
        *last_sweep = now;

        let removed = self.evict_idle_at(now);
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = self.windows.len(),
                "Evicted idle rate limit partitions"
            );
        }
    }
}

/// Partition key for a request: caller name if authenticated, else `Host`.
pub fn partition_key(request: &Request<Body>) -> String {
    match request.extensions().get::<CallerIdentity>() {
        Some(identity) => identity.name.clone(),
        None => request_host(request),
    }
}

fn request_host(request: &Request<Body>) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Admission middleware; must sit in front of every handler.
pub async fn admission_middleware(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = partition_key(&request);

    match limiter.check(request.uri().path(), &key) {
        Admission::Rejected { retry_after } => {
            let user = request
                .extensions()
                .get::<CallerIdentity>()
                .map(|identity| identity.name.as_str())
                .unwrap_or("anonymous");
            tracing::warn!(
                user = %user,
                host = %request_host(&request),
                retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
                "Rate limit exceeded"
            );
            metrics::record_rate_limited();
            RateLimitRejection::new(retry_after).into_response()
        }
        Admission::Exempt | Admission::Admitted { .. } => next.run(request).await,
    }
}
