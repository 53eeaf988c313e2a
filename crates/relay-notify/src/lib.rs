//! Alert formatting, batching and rate-limited delivery to a Discord webhook.
//!
//! `relay-notify` is the core of the relay. It accepts alerts from
//! monitoring sources, renders each one as a size-bounded Discord embed, and
//! posts the embeds in batches while staying under the webhook's request
//! quota.
//!
//! # Features
//!
//! - **Canonical alerts**: [`Alert`] validates its content at construction
//! - **Formatting**: severity/status styling and Discord size limits
//! - **Source adapters**: Prometheus Alertmanager and Home Assistant payloads
//! - **Batching**: at most ten embeds per webhook call, in input order
//! - **Rate limiting**: sliding-window admission shared between callers
//!
//! # Example
//!
//! ```rust,no_run
//! use relay_notify::{Alert, HttpTransport, Notifier, NotifierConfig};
//!
//! # async fn run() -> relay_notify::Result<()> {
//! let transport = HttpTransport::with_default_timeout("https://discord.com/api/webhooks/1/abc")?;
//! let notifier = Notifier::new(transport, NotifierConfig::default());
//!
//! let alert = Alert::builder("BatteryTemperature")
//!     .summary("Battery fire risk")
//!     .severity("critical")
//!     .build()?;
//!
//! notifier.send(vec![alert]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Formatting only
//!
//! ```rust
//! use relay_notify::{format_alert, Alert, AlertStatus};
//!
//! let alert = Alert::builder("DiskFull")
//!     .description("Root volume at 99%")
//!     .status(AlertStatus::Resolved)
//!     .build()
//!     .unwrap();
//!
//! let embed = format_alert(&alert);
//! assert_eq!(embed.title, "✅ RESOLVED: DiskFull");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod notifier;
pub mod rate_limit;
pub mod sources;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use error::{DeliveryError, NotifyError, Result};
pub use format::{format_alert, format_alert_at, truncate, Embed, EmbedField, EmbedFooter};
pub use notifier::{Notifier, NotifierConfig, MAX_EMBEDS_PER_MESSAGE};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use sources::{AlertmanagerPayload, HomeAssistantNotification, IntoEmbeds};
pub use transport::{HttpTransport, LogTransport, Transport, WebhookMessage};
pub use types::{Alert, AlertBuilder, AlertStatus, Severity};
