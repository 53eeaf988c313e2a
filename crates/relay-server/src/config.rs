//! Relay server settings.
//!
//! Every setting can be given as a command-line flag or through the
//! environment variable named next to it.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use relay_notify::notifier::DEFAULT_USERNAME;
use relay_notify::{NotifierConfig, RateLimitConfig};
use url::Url;

use crate::error::{ServerError, ServerResult};

/// Hosts that serve Discord webhooks.
const DISCORD_HOSTS: [&str; 4] = [
    "discord.com",
    "discordapp.com",
    "ptb.discord.com",
    "canary.discord.com",
];

/// Path prefix of every Discord webhook URL.
const WEBHOOK_PATH_PREFIX: &str = "/api/webhooks/";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings for the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "relay-server")]
#[command(about = "Relays monitoring alerts to a Discord webhook")]
#[command(version)]
pub struct Settings {
    /// Discord webhook URL that receives every alert
    #[arg(long, env = "DISCORD_WEBHOOK_URL")]
    pub discord_webhook_url: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Application name reported in logs
    #[arg(long, env = "APP_NAME", default_value = "lab-alert-middleware")]
    pub app_name: String,

    /// Display name the Discord messages are posted under
    #[arg(long, env = "RELAY_USERNAME", default_value = DEFAULT_USERNAME)]
    pub username: String,

    /// Maximum webhook calls per rate-limit window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value_t = 30)]
    pub rate_limit_max_requests: u32,

    /// Rate-limit window length in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Timeout for one webhook call in seconds
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECS", default_value_t = 10)]
    pub webhook_timeout_secs: u64,

    /// Log embeds instead of posting them
    #[arg(long, env = "RELAY_DRY_RUN")]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Checks every setting that clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` for an invalid webhook URL, rate limit
    /// or timeout.
    pub fn validate(&self) -> ServerResult<()> {
        validate_webhook_url(&self.discord_webhook_url)?;
        self.rate_limit()?;
        if self.webhook_timeout_secs == 0 {
            return Err(ServerError::Config(
                "webhook timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The per-call webhook timeout.
    #[must_use]
    pub const fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    /// The outbound rate limit.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the limit is zero or the window is empty.
    pub fn rate_limit(&self) -> ServerResult<RateLimitConfig> {
        RateLimitConfig::new(
            self.rate_limit_max_requests,
            Duration::from_secs(self.rate_limit_window_secs),
        )
        .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Notifier configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// See [`Settings::rate_limit`].
    pub fn notifier_config(&self) -> ServerResult<NotifierConfig> {
        Ok(NotifierConfig::default()
            .with_username(self.username.clone())
            .with_rate_limit(self.rate_limit()?))
    }
}

/// Checks that `raw` is an HTTPS Discord webhook URL.
///
/// # Errors
///
/// Returns `ServerError::Config` if it is not.
pub fn validate_webhook_url(raw: &str) -> ServerResult<Url> {
    let invalid = || {
        ServerError::Config("discord_webhook_url must be a valid Discord webhook URL".to_string())
    };

    let url = Url::parse(raw).map_err(|_| invalid())?;
    let host_ok = url
        .host_str()
        .is_some_and(|host| DISCORD_HOSTS.contains(&host));
    let path_ok = url
        .path()
        .strip_prefix(WEBHOOK_PATH_PREFIX)
        .is_some_and(|rest| !rest.is_empty());

    if url.scheme() != "https" || !host_ok || !path_ok {
        return Err(invalid());
    }
    Ok(url)
}
