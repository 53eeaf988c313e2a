//! Discord alert relay binary.
//!
//! Usage:
//!   relay-server --discord-webhook-url https://discord.com/api/webhooks/...
//!   DISCORD_WEBHOOK_URL=... relay-server --port 8080 --dry-run

use anyhow::{Context, Result};
use clap::Parser;
use relay_notify::{HttpTransport, LogTransport, Notifier, NotifierConfig, Transport};
use relay_server::telemetry::init_tracing;
use relay_server::{RelayServer, Settings};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    init_tracing(settings.log_format);

    settings.validate().context("invalid settings")?;
    let config = settings.notifier_config()?;

    info!(
        app = %settings.app_name,
        addr = %settings.bind_addr(),
        max_requests = config.rate_limit.max_requests(),
        window_secs = config.rate_limit.window().as_secs(),
        dry_run = settings.dry_run,
        "starting alert relay"
    );

    if settings.dry_run {
        warn!("dry run enabled, alerts will be logged and not sent");
        run(LogTransport, config, &settings).await
    } else {
        let transport =
            HttpTransport::new(&settings.discord_webhook_url, settings.webhook_timeout())
                .context("failed to create webhook transport")?;
        run(transport, config, &settings).await
    }
}

async fn run<T: Transport + 'static>(
    transport: T,
    config: NotifierConfig,
    settings: &Settings,
) -> Result<()> {
    let server = RelayServer::new(Notifier::new(transport, config), settings.app_name.clone());
    server
        .serve_with_shutdown(settings.bind_addr(), shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
