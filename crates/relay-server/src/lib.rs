//! # relay-server
//!
//! HTTP receiver that relays monitoring alerts to a Discord webhook.
//!
//! The server accepts alerts in three formats, renders them with
//! [`relay_notify`] and delivers them through one shared, rate-limited
//! notifier.
//!
//! ## Example
//!
//! ```rust,no_run
//! use relay_notify::{HttpTransport, Notifier, NotifierConfig};
//! use relay_server::RelayServer;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::with_default_timeout("https://discord.com/api/webhooks/1/abc")?;
//! let server = RelayServer::new(Notifier::new(transport, NotifierConfig::default()), "lab");
//! server.serve("0.0.0.0:5001".parse()?).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Liveness check |
//! | `/discord-alert` | POST | One canonical alert or a list of them |
//! | `/webhook` | POST | Prometheus Alertmanager notification |
//! | `/webhook/homeassistant` | POST | Home Assistant notification |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

// Re-export main types
pub use config::{LogFormat, Settings};
pub use error::{ServerError, ServerResult};
pub use server::RelayServer;
pub use state::RelayState;
