//! Prometheus Alertmanager webhook receiver format.
//!
//! Alertmanager posts version 4 webhook bodies. Each alert becomes one embed
//! titled by its `alertname` label, with the remaining labels listed in a
//! `Tags` field. Resolved alerts keep the legacy bright-green accent.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::format::{
    resolve_timestamp, truncate, Embed, EmbedField, SeverityStyle, MAX_DESCRIPTION_CHARS,
    MAX_TITLE_CHARS,
};
use crate::sources::IntoEmbeds;
use crate::types::{AlertStatus, Severity};

/// Accent used for resolved Alertmanager alerts.
pub const ALERTMANAGER_RESOLVED_COLOR: u32 = 0x00_FF00;

/// Title used when an alert carries no `alertname` label.
pub const UNKNOWN_ALERT_NAME: &str = "Unknown Alert";

/// Description used when an alert carries neither summary nor description.
pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No description provided";

/// Labels rendered elsewhere in the embed and left out of `Tags`.
const RESERVED_LABELS: [&str; 2] = ["alertname", "severity"];

/// The webhook body sent by Alertmanager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertmanagerPayload {
    /// The alerts in this notification.
    pub alerts: Vec<AlertmanagerAlert>,
    /// Webhook format version.
    #[serde(default)]
    pub version: Option<String>,
    /// Group key identifying this alert group.
    #[serde(default)]
    pub group_key: Option<String>,
    /// Status of the whole group.
    #[serde(default)]
    pub status: Option<AlertStatus>,
    /// The receiver that handled this notification.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Labels used for grouping.
    #[serde(default)]
    pub group_labels: BTreeMap<String, String>,
    /// Labels common to all alerts.
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,
    /// Annotations common to all alerts.
    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,
    /// Link back to the Alertmanager UI.
    #[serde(default, rename = "externalURL", alias = "externalUrl")]
    pub external_url: Option<String>,
    /// Number of alerts Alertmanager dropped from this notification.
    #[serde(default)]
    pub truncated_alerts: usize,
}

/// One alert inside an Alertmanager webhook body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertmanagerAlert {
    /// The status of this alert.
    #[serde(default)]
    pub status: AlertStatus,
    /// Labels attached to the alert.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Annotations for the alert.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// When the alert started firing.
    #[serde(default)]
    pub starts_at: Option<String>,
    /// When the alert ended (if resolved).
    #[serde(default)]
    pub ends_at: Option<String>,
    /// URL to the alert source.
    #[serde(default, rename = "generatorURL", alias = "generatorUrl")]
    pub generator_url: Option<String>,
    /// Fingerprint for deduplication.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl AlertmanagerAlert {
    /// The `alertname` label, or [`UNKNOWN_ALERT_NAME`].
    #[must_use]
    pub fn name(&self) -> &str {
        self.labels
            .get("alertname")
            .map_or(UNKNOWN_ALERT_NAME, String::as_str)
    }

    /// The `severity` label, defaulting to info.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.labels
            .get("severity")
            .map(|s| Severity::parse(s))
            .unwrap_or_default()
    }

    /// Renders this alert as an embed.
    #[must_use]
    pub fn to_embed(&self) -> Embed {
        let name = self.name();
        let severity = self.severity();
        let style = SeverityStyle::of(&severity);

        let (title, color) = match self.status {
            AlertStatus::Resolved => (
                format!("✅ RESOLVED: {name}"),
                ALERTMANAGER_RESOLVED_COLOR,
            ),
            AlertStatus::Firing => (
                format!(
                    "{} {}: {name}",
                    style.marker,
                    severity.as_str().to_uppercase()
                ),
                style.color,
            ),
        };

        let summary = self.annotation("summary");
        let details = self.annotation("description");

        let mut fields = Vec::new();
        let description = match (summary, details) {
            (Some(summary), details) => {
                if let Some(details) = details {
                    fields.push(EmbedField::new("Details", details));
                }
                summary
            }
            (None, Some(details)) => details,
            (None, None) => NO_DESCRIPTION_PLACEHOLDER,
        };

        if let Some(tags) = self.tags() {
            fields.push(EmbedField::new("Tags", &tags));
        }

        Embed {
            title: truncate(&title, MAX_TITLE_CHARS),
            description: truncate(description, MAX_DESCRIPTION_CHARS),
            color,
            fields,
            timestamp: resolve_timestamp(self.starts_at.as_deref(), name, Utc::now()),
            footer: None,
        }
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Non-reserved labels as `**key**: value` lines, sorted by key.
    fn tags(&self) -> Option<String> {
        let mut out = String::new();
        for (key, value) in self
            .labels
            .iter()
            .filter(|(k, _)| !RESERVED_LABELS.contains(&k.as_str()))
        {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "**{key}**: {value}");
        }
        (!out.is_empty()).then_some(out)
    }
}

impl IntoEmbeds for AlertmanagerPayload {
    fn into_embeds(self) -> Vec<Embed> {
        self.alerts.iter().map(AlertmanagerAlert::to_embed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_alert(value: serde_json::Value) -> AlertmanagerAlert {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn format_alert_firing() {
        let alert = parse_alert(json!({
            "status": "firing",
            "labels": {
                "alertname": "TestAlert",
                "severity": "critical",
                "service": "backend"
            },
            "annotations": {
                "summary": "This is a summary",
                "description": "This is a description"
            },
            "startsAt": "2023-01-01T00:00:00Z"
        }));

        let embed = alert.to_embed();

        assert_eq!(embed.title, "🔥 CRITICAL: TestAlert");
        assert_eq!(embed.description, "This is a summary");
        assert_eq!(embed.color, 0xFF0000);
        assert_eq!(embed.timestamp, "2023-01-01T00:00:00+00:00");
        assert!(embed
            .fields
            .iter()
            .any(|f| f.name == "Details" && f.value == "This is a description"));
        assert!(embed
            .fields
            .iter()
            .any(|f| f.name == "Tags" && f.value.contains("**service**: backend")));
    }

    #[test]
    fn format_alert_resolved() {
        let alert = parse_alert(json!({
            "status": "resolved",
            "labels": {"alertname": "TestAlert", "severity": "critical"},
            "annotations": {"summary": "This is a summary"}
        }));

        let embed = alert.to_embed();

        assert_eq!(embed.title, "✅ RESOLVED: TestAlert");
        assert_eq!(embed.color, ALERTMANAGER_RESOLVED_COLOR);
        assert!(embed.fields.is_empty());
    }

    #[test]
    fn missing_labels_use_fallbacks() {
        let alert = parse_alert(json!({"status": "firing"}));

        let embed = alert.to_embed();

        assert_eq!(embed.title, "ℹ️ INFO: Unknown Alert");
        assert_eq!(embed.description, NO_DESCRIPTION_PLACEHOLDER);
        assert!(embed.fields.is_empty());
    }

    #[test]
    fn description_used_when_summary_missing() {
        let alert = parse_alert(json!({
            "status": "firing",
            "labels": {"alertname": "A"},
            "annotations": {"description": "only the long form"}
        }));

        let embed = alert.to_embed();

        assert_eq!(embed.description, "only the long form");
        assert!(embed.fields.iter().all(|f| f.name != "Details"));
    }

    #[test]
    fn tags_sorted_and_reserved_labels_skipped() {
        let alert = parse_alert(json!({
            "status": "firing",
            "labels": {
                "alertname": "A",
                "severity": "warning",
                "zone": "b",
                "instance": "lab-pc-1:9100"
            },
            "annotations": {"summary": "s"}
        }));

        let embed = alert.to_embed();
        let tags = embed.fields.iter().find(|f| f.name == "Tags").unwrap();

        assert_eq!(tags.value, "**instance**: lab-pc-1:9100\n**zone**: b");
        assert!(!tags.inline);
    }

    #[test]
    fn malformed_starts_at_falls_back() {
        let alert = parse_alert(json!({
            "status": "firing",
            "labels": {"alertname": "A"},
            "annotations": {"summary": "s"},
            "startsAt": "not a time"
        }));

        let embed = alert.to_embed();
        assert!(chrono::DateTime::parse_from_rfc3339(&embed.timestamp).is_ok());
    }

    #[test]
    fn payload_requires_alerts() {
        let result = serde_json::from_value::<AlertmanagerPayload>(json!({"status": "firing"}));
        assert!(result.is_err());
    }

    #[test]
    fn payload_into_embeds_keeps_order() {
        let payload: AlertmanagerPayload = serde_json::from_value(json!({
            "version": "4",
            "groupKey": "{}:{alertname=\"A\"}",
            "status": "firing",
            "receiver": "discord",
            "externalURL": "http://alertmanager:9093",
            "alerts": [
                {"status": "firing", "labels": {"alertname": "First"}, "annotations": {"summary": "1"}},
                {"status": "resolved", "labels": {"alertname": "Second"}, "annotations": {"summary": "2"}}
            ]
        }))
        .unwrap();

        assert_eq!(payload.external_url.as_deref(), Some("http://alertmanager:9093"));

        let embeds = payload.into_embeds();

        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].title, "ℹ️ INFO: First");
        assert_eq!(embeds[1].title, "✅ RESOLVED: Second");
    }
}
