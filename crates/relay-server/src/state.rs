//! Shared state for the relay server.

use std::time::Instant;

use relay_notify::{Notifier, Transport};

/// Shared state for the relay server.
///
/// One notifier, and therefore one rate limiter, serves every route.
pub struct RelayState<T> {
    /// Notifier all alerts are delivered through.
    notifier: Notifier<T>,
    /// Application name reported in logs.
    app_name: String,
    /// Server start time.
    start_time: Instant,
}

impl<T: Transport> RelayState<T> {
    /// Create a new relay state.
    #[must_use]
    pub fn new(notifier: Notifier<T>, app_name: impl Into<String>) -> Self {
        Self {
            notifier,
            app_name: app_name.into(),
            start_time: Instant::now(),
        }
    }

    /// Get the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
