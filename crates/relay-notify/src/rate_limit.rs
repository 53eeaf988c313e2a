//! Outbound rate limiting.
//!
//! Discord limits how many requests a webhook accepts per time window.
//! [`RateLimiter`] keeps the instants of recent admissions in a sliding
//! window and suspends callers until the oldest admission expires.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{NotifyError, Result};

/// Default maximum admissions per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 30;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Slack added to every computed wait so the oldest admission has left the window on wake-up.
const WAIT_EPSILON: Duration = Duration::from_millis(10);

/// Rate limit configuration.
///
/// Built through [`RateLimitConfig::new`], which rejects a zero limit or an
/// empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    max_requests: u32,
    window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RateLimitConfig {
    /// Creates a configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidConfig` if `max_requests` is zero or the
    /// window is empty.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(NotifyError::InvalidConfig {
                reason: "rate limit max_requests must be at least 1".to_string(),
            });
        }
        if window.is_zero() {
            return Err(NotifyError::InvalidConfig {
                reason: "rate limit window cannot be zero".to_string(),
            });
        }
        Ok(Self {
            max_requests,
            window,
        })
    }

    /// Maximum admissions within one window.
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

/// Admission timestamps within the trailing window.
#[derive(Debug)]
struct SlidingWindow {
    timestamps: VecDeque<Instant>,
    window: Duration,
    max_requests: u32,
}

impl SlidingWindow {
    fn new(config: RateLimitConfig) -> Self {
        // A window that admits nothing would stall every caller forever.
        let max_requests = config.max_requests.max(1);
        Self {
            timestamps: VecDeque::with_capacity(max_requests as usize + 1),
            window: config.window,
            max_requests,
        }
    }

    fn purge(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        while self.timestamps.front().is_some_and(|t| *t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    /// Admits at `now`, or returns how long to wait before trying again.
    fn try_admit(&mut self, now: Instant) -> std::result::Result<(), Duration> {
        self.purge(now);

        if (self.timestamps.len() as u32) < self.max_requests {
            self.timestamps.push_back(now);
            return Ok(());
        }

        let wait = self.timestamps.front().map_or(Duration::ZERO, |oldest| {
            (*oldest + self.window).saturating_duration_since(now) + WAIT_EPSILON
        });
        Err(wait)
    }
}

/// Sliding-window admission controller for outbound webhook calls.
///
/// Share one limiter (behind an `Arc`) between every caller that targets
/// the same webhook. Purge, check and record happen under a single lock,
/// so concurrent callers can never push the window past `max_requests`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Mutex<SlidingWindow>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window: Mutex::new(SlidingWindow::new(config)),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Attempts one admission without waiting.
    ///
    /// # Errors
    ///
    /// Returns the time to wait before the next attempt can succeed.
    pub fn try_acquire(&self) -> std::result::Result<(), Duration> {
        self.window.lock().try_admit(Instant::now())
    }

    /// Waits until a call may proceed, then records it.
    ///
    /// The window is re-evaluated after every wait because other callers may
    /// have been admitted in the meantime.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => {
                    debug!(
                        wait_ms = wait.as_millis() as u64,
                        max_requests = self.config.max_requests,
                        window_secs = self.config.window.as_secs_f64(),
                        "rate limit reached, waiting"
                    );
                    if wait.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }
    }

    /// Number of admissions inside the trailing window.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        let mut window = self.window.lock();
        window.purge(Instant::now());
        window.timestamps.len() as u32
    }
}
