//! Adapters from source-specific payloads to embeds.
//!
//! Each alert source whose payload is not a canonical [`Alert`] gets its own
//! adapter. Adapters produce embeds directly; they share batching, rate
//! limiting and delivery with canonical alerts through
//! [`Notifier::send_single`](crate::notifier::Notifier::send_single).

pub mod alertmanager;
pub mod homeassistant;

pub use alertmanager::{AlertmanagerAlert, AlertmanagerPayload};
pub use homeassistant::{HomeAssistantData, HomeAssistantNotification};

use crate::format::{format_alert, Embed};
use crate::types::Alert;

/// A payload that can be rendered as an ordered list of embeds.
pub trait IntoEmbeds {
    /// Converts the payload, preserving the order of the alerts it carries.
    fn into_embeds(self) -> Vec<Embed>;
}

impl IntoEmbeds for Alert {
    fn into_embeds(self) -> Vec<Embed> {
        vec![format_alert(&self)]
    }
}

impl IntoEmbeds for Vec<Alert> {
    fn into_embeds(self) -> Vec<Embed> {
        self.iter().map(format_alert).collect()
    }
}

impl IntoEmbeds for Vec<Embed> {
    fn into_embeds(self) -> Vec<Embed> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_keep_their_order() {
        let alerts: Vec<Alert> = (0..3)
            .map(|i| {
                Alert::builder(format!("Alert {i}"))
                    .summary("s")
                    .build()
                    .unwrap()
            })
            .collect();

        let embeds = alerts.into_embeds();

        let titles: Vec<_> = embeds.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["ℹ️ INFO: Alert 0", "ℹ️ INFO: Alert 1", "ℹ️ INFO: Alert 2"]
        );
    }

    #[test]
    fn single_alert_is_one_embed() {
        let alert = Alert::builder("One").description("d").build().unwrap();
        assert_eq!(alert.into_embeds().len(), 1);
    }
}
