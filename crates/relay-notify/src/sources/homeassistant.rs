//! Home Assistant notify-platform payloads.
//!
//! Home Assistant's REST notifier posts `{"title", "message", "data"}`. The
//! message becomes the embed body and the severity, if any, rides along in
//! `data`.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::format::{
    resolve_timestamp, truncate, Embed, EmbedFooter, SeverityStyle, MAX_DESCRIPTION_CHARS,
    MAX_TITLE_CHARS,
};
use crate::sources::IntoEmbeds;
use crate::types::Severity;

/// Title used when the notification has none.
pub const DEFAULT_TITLE: &str = "Home Assistant";

/// Footer text marking embeds from Home Assistant.
pub const FOOTER_TEXT: &str = "Source: Home Assistant";

/// A notification sent by Home Assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantNotification {
    /// Notification title.
    #[serde(default)]
    pub title: Option<String>,
    /// Notification body.
    pub message: String,
    /// Extra data attached by the automation.
    #[serde(default)]
    pub data: Option<HomeAssistantData>,
}

/// The `data` object of a Home Assistant notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeAssistantData {
    /// Severity chosen by the automation.
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Any other keys, kept but not rendered.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HomeAssistantNotification {
    /// Severity from `data.severity`, defaulting to info.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.data
            .as_ref()
            .and_then(|d| d.severity.clone())
            .unwrap_or_default()
    }

    /// Renders this notification as an embed.
    #[must_use]
    pub fn to_embed(&self) -> Embed {
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE);

        Embed {
            title: truncate(title, MAX_TITLE_CHARS),
            description: truncate(&self.message, MAX_DESCRIPTION_CHARS),
            color: SeverityStyle::of(&self.severity()).color,
            fields: Vec::new(),
            timestamp: resolve_timestamp(None, title, Utc::now()),
            footer: Some(EmbedFooter {
                text: FOOTER_TEXT.to_string(),
            }),
        }
    }
}

impl IntoEmbeds for HomeAssistantNotification {
    fn into_embeds(self) -> Vec<Embed> {
        vec![self.to_embed()]
    }
}
