//! Route configuration for the relay.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use relay_notify::Transport;
use tower_http::trace::TraceLayer;

use crate::handlers::{alertmanager_webhook, health_check, homeassistant_webhook, unified_alert};
use crate::state::RelayState;

/// Create the relay router.
pub fn create_router<T: Transport + 'static>(state: Arc<RelayState<T>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Canonical alerts
        .route("/discord-alert", post(unified_alert::<T>))
        // Source-specific formats
        .route("/webhook", post(alertmanager_webhook::<T>))
        .route("/webhook/homeassistant", post(homeassistant_webhook::<T>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
