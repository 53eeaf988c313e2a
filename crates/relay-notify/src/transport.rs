//! Delivery of embed batches to the Discord webhook.
//!
//! The [`Transport`] trait is the seam between the dispatch loop and the
//! network. [`HttpTransport`] posts to Discord; [`LogTransport`] only logs
//! and is used for dry runs.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DeliveryError, NotifyError, Result};
use crate::format::Embed;

/// Default time budget for one webhook call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of one Discord execute-webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    /// The embeds in this batch, in alert order.
    pub embeds: Vec<Embed>,
    /// Display name the message is posted under.
    pub username: String,
}

/// Something that can deliver one batch as one outbound call.
pub trait Transport: Send + Sync {
    /// Delivers the message.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] describing why the call failed.
    fn deliver(
        &self,
        message: &WebhookMessage,
    ) -> impl Future<Output = std::result::Result<(), DeliveryError>> + Send;
}

/// Posts batches to a Discord webhook URL over HTTPS.
///
/// Idle connections are not pooled, so the connection opened for a call is
/// closed once that call finishes, whatever its outcome.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for the given webhook URL.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidConfig` if the URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| NotifyError::InvalidConfig {
            reason: format!("invalid webhook URL: {e}"),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| NotifyError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Creates a transport with the default 10 second timeout.
    ///
    /// # Errors
    ///
    /// See [`HttpTransport::new`].
    pub fn with_default_timeout(url: &str) -> Result<Self> {
        Self::new(url, DEFAULT_TIMEOUT)
    }

    /// Returns the webhook URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: &reqwest::Error) -> DeliveryError {
        if err.is_timeout() {
            DeliveryError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            DeliveryError::Unreachable {
                reason: err.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn deliver(&self, message: &WebhookMessage) -> std::result::Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "webhook accepted batch");
            return Ok(());
        }

        let body = response.text().await;
        Err(DeliveryError::ProviderRejected {
            status: status.as_u16(),
            detail: rejection_detail(status, body),
        })
    }
}

/// Detail for a rejected call: the body if there is one, else the status reason.
fn rejection_detail<E: fmt::Display>(
    status: StatusCode,
    body: std::result::Result<String, E>,
) -> String {
    match body {
        Ok(body) if !body.trim().is_empty() => error_detail(body),
        Ok(_) => status
            .canonical_reason()
            .unwrap_or("empty response body")
            .to_string(),
        Err(e) => format!("failed to read response body: {e}"),
    }
}

/// Prefers the JSON error body, re-serialized compactly; falls back to raw text.
fn error_detail(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => value.to_string(),
        Err(_) => body,
    }
}

/// A transport that logs batches instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    async fn deliver(&self, message: &WebhookMessage) -> std::result::Result<(), DeliveryError> {
        for embed in &message.embeds {
            info!(
                username = %message.username,
                title = %embed.title,
                color = embed.color,
                timestamp = %embed.timestamp,
                "dry run: would send embed"
            );
        }
        Ok(())
    }
}
