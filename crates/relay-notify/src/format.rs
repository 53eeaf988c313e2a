//! Conversion of alerts into Discord embeds.
//!
//! Discord enforces hard limits on embed sizes; every text that may come
//! from an alert source goes through [`truncate`] with the matching cap.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Alert, Severity};

/// Maximum characters in an embed title.
pub const MAX_TITLE_CHARS: usize = 256;
/// Maximum characters in an embed description.
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
/// Maximum characters in an embed field value.
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Body used when an alert carries neither summary nor description.
pub const NO_DETAILS_PLACEHOLDER: &str = "No details provided";

/// Accent used for resolved alerts.
pub const RESOLVED_COLOR: u32 = 0x2E_CC71;
/// Accent used for severities without a dedicated style.
pub const DEFAULT_COLOR: u32 = 0x80_8080;

/// Visual style of a severity: its marker emoji and accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    /// Emoji placed in front of the heading.
    pub marker: &'static str,
    /// Embed accent color.
    pub color: u32,
}

impl SeverityStyle {
    /// Looks up the style of a severity. Unknown severities get the neutral style.
    #[must_use]
    pub const fn of(severity: &Severity) -> Self {
        match severity {
            Severity::Critical => Self {
                marker: "🔥",
                color: 0xFF_0000,
            },
            Severity::Warning => Self {
                marker: "⚠️",
                color: 0xFF_A500,
            },
            Severity::Info => Self {
                marker: "ℹ️",
                color: 0x21_96F3,
            },
            Severity::Other(_) => Self {
                marker: "📊",
                color: DEFAULT_COLOR,
            },
        }
    }
}

/// A field inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Whether Discord may render this field next to others.
    pub inline: bool,
}

impl EmbedField {
    /// Creates a non-inline field, truncating the value to [`MAX_FIELD_VALUE_CHARS`].
    #[must_use]
    pub fn new(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            value: truncate(value, MAX_FIELD_VALUE_CHARS),
            inline: false,
        }
    }
}

/// Footer line of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
}

/// One formatted, size-bounded message unit representing one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Heading: status/severity marker plus alert title.
    pub title: String,
    /// Primary message text.
    pub description: String,
    /// Accent color.
    pub color: u32,
    /// Secondary fields, possibly empty.
    pub fields: Vec<EmbedField>,
    /// RFC 3339 timestamp shown by Discord.
    pub timestamp: String,
    /// Optional footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

/// Truncates `text` to at most `cap` characters.
///
/// Text longer than `cap` keeps its first `cap - 3` characters followed by
/// [`ELLIPSIS`], so the result is exactly `cap` characters long.
#[must_use]
pub fn truncate(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let keep = cap.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Formats an alert, using the current time as timestamp fallback.
#[must_use]
pub fn format_alert(alert: &Alert) -> Embed {
    format_alert_at(alert, Utc::now())
}

/// Formats an alert, using `now` as timestamp fallback.
#[must_use]
pub fn format_alert_at(alert: &Alert, now: DateTime<Utc>) -> Embed {
    let severity = alert.severity();
    let style = SeverityStyle::of(severity);

    let (heading, color) = if alert.status().is_resolved() {
        (format!("✅ RESOLVED: {}", alert.title()), RESOLVED_COLOR)
    } else {
        (
            format!(
                "{} {}: {}",
                style.marker,
                severity.as_str().to_uppercase(),
                alert.title()
            ),
            style.color,
        )
    };

    let mut fields = Vec::new();
    let description = match (alert.summary(), alert.description()) {
        (Some(summary), description) => {
            if let Some(details) = description {
                fields.push(EmbedField::new("Details", details));
            }
            truncate(summary, MAX_DESCRIPTION_CHARS)
        }
        (None, Some(description)) => truncate(description, MAX_DESCRIPTION_CHARS),
        (None, None) => NO_DETAILS_PLACEHOLDER.to_string(),
    };

    Embed {
        title: truncate(&heading, MAX_TITLE_CHARS),
        description,
        color,
        fields,
        timestamp: resolve_timestamp(alert.timestamp(), alert.title(), now),
        footer: None,
    }
}

/// Resolves a raw source timestamp to RFC 3339, falling back to `now`.
///
/// A malformed value is logged and replaced; it never fails the caller.
#[must_use]
pub fn resolve_timestamp(raw: Option<&str>, context: &str, now: DateTime<Utc>) -> String {
    let Some(raw) = raw else {
        return render(now.fixed_offset());
    };

    if let Some(parsed) = parse_timestamp(raw) {
        return render(parsed);
    }

    warn!(
        timestamp = %raw,
        alert = %context,
        "invalid timestamp format, using current time instead"
    );
    render(now.fixed_offset())
}

/// ISO-8601 layouts with an offset. `%#z` takes `Z`, `+hh`, `+hhmm` and `+hh:mm`.
const OFFSET_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// ISO-8601 layouts without an offset.
const NAIVE_PATTERNS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_PATTERNS
        .iter()
        .find_map(|pattern| DateTime::parse_from_str(raw, pattern).ok())
    {
        return Some(dt);
    }
    // Naive values carry no offset; read them as UTC.
    NAIVE_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Whole seconds when there is no sub-second part, otherwise microseconds.
fn render(dt: DateTime<FixedOffset>) -> String {
    let precision = if dt.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    dt.to_rfc3339_opts(precision, false)
}
