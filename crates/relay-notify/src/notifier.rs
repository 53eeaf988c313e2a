//! Batching and rate-limited dispatch.
//!
//! The [`Notifier`] turns alerts into embeds, groups them into batches of at
//! most [`MAX_EMBEDS_PER_MESSAGE`] and sends the batches one after another
//! through its [`Transport`], asking the shared [`RateLimiter`] before each
//! call. The first failed batch aborts the whole send; batches already
//! delivered stay delivered.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{NotifyError, Result};
use crate::format::Embed;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::sources::IntoEmbeds;
use crate::transport::{Transport, WebhookMessage};
use crate::types::Alert;

/// Discord accepts at most this many embeds per message.
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;

/// Default display name for relayed messages.
pub const DEFAULT_USERNAME: &str = "HomeLab Monitor";

/// Configuration for a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Display name the messages are posted under.
    pub username: String,
    /// Outbound rate limit.
    pub rate_limit: RateLimitConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl NotifierConfig {
    /// Sets the display name.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// Formats, batches and dispatches alerts to one webhook.
#[derive(Debug)]
pub struct Notifier<T> {
    transport: T,
    limiter: Arc<RateLimiter>,
    username: String,
}

impl<T: Transport> Notifier<T> {
    /// Creates a notifier with its own rate limiter.
    #[must_use]
    pub fn new(transport: T, config: NotifierConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Self::with_limiter(transport, limiter, config.username)
    }

    /// Creates a notifier sharing an existing rate limiter.
    #[must_use]
    pub fn with_limiter(transport: T, limiter: Arc<RateLimiter>, username: impl Into<String>) -> Self {
        Self {
            transport,
            limiter,
            username: username.into(),
        }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Formats and delivers canonical alerts, in order.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Delivery` for the first batch that fails; later
    /// batches are not attempted.
    pub async fn send(&self, alerts: Vec<Alert>) -> Result<()> {
        self.send_embeds(alerts.into_embeds()).await
    }

    /// Converts a source-specific payload and delivers it.
    ///
    /// # Errors
    ///
    /// See [`Notifier::send`].
    pub async fn send_single<P: IntoEmbeds>(&self, payload: P) -> Result<()> {
        self.send_embeds(payload.into_embeds()).await
    }

    /// Batches and delivers already formatted embeds.
    ///
    /// # Errors
    ///
    /// See [`Notifier::send`].
    pub async fn send_embeds(&self, embeds: Vec<Embed>) -> Result<()> {
        let total = embeds.len().div_ceil(MAX_EMBEDS_PER_MESSAGE);

        for (index, batch) in embeds.chunks(MAX_EMBEDS_PER_MESSAGE).enumerate() {
            self.limiter.acquire().await;

            let message = WebhookMessage {
                embeds: batch.to_vec(),
                username: self.username.clone(),
            };

            if let Err(err) = self.transport.deliver(&message).await {
                error!(
                    batch = index + 1,
                    batches = total,
                    kind = err.kind(),
                    status = err.status(),
                    error = %err,
                    "discord webhook delivery failed"
                );
                return Err(NotifyError::Delivery(err));
            }

            info!(
                batch = index + 1,
                batches = total,
                embeds = batch.len(),
                "successfully sent {} embed(s) to discord",
                batch.len()
            );
        }

        Ok(())
    }
}
