//! Fixed-window rate limiting for the management API
//!
//! Counts requests per client key (the peer IP) in one-minute windows. The
//! first request in a window starts it; requests past the configured maximum
//! are rejected until the window rolls over. Windows are tracked in memory
//! and stale entries are dropped opportunistically.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    count: u32,
}

/// In-memory fixed-window counter keyed by client identifier.
pub struct RateLimiter {
    max_requests: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `client`. Returns `true` if the request is
    /// within budget, `false` if the client exhausted the current window.
    pub fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|p| p.into_inner());

        // Drop windows that rolled over so the map stays bounded by the
        // number of recently active clients.
        windows.retain(|_, w| now.duration_since(w.started) < WINDOW);

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}
