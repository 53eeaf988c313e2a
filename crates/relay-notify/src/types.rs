//! Core types for the relay.
//!
//! - [`Severity`]: how urgent an alert is, including severities we do not know
//! - [`AlertStatus`]: whether the alert is firing or resolved
//! - [`Alert`]: the canonical, validated alert accepted by the notifier

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NotifyError, Result};

/// The severity level of an alert.
///
/// Parsing is case-insensitive. Values outside the known set are kept
/// (lowercased) in [`Severity::Other`] and rendered with the neutral style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Critical alert, requires immediate attention.
    Critical,
    /// Warning alert, should be investigated.
    Warning,
    /// Informational alert, no action required.
    #[default]
    Info,
    /// A severity the relay has no style for.
    Other(String),
}

impl Severity {
    /// Parses a severity, falling back to [`Severity::Other`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let lowered = value.trim().to_lowercase();
        match lowered.as_str() {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            "info" => Self::Info,
            _ => Self::Other(lowered),
        }
    }

    /// Returns the severity as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Other(value) => value,
        }
    }

    /// Returns true if the relay has a dedicated style for this severity.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Whether an alert is currently firing or has been resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// The alert is actively firing.
    #[default]
    Firing,
    /// The alert was firing but has been resolved.
    Resolved,
}

impl AlertStatus {
    /// Returns the status as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
        }
    }

    /// Returns true if the alert has been resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical alert.
///
/// Construction goes through [`Alert::builder`] or serde, both of which
/// enforce that the title is non-empty and that at least one of `summary`
/// and `description` carries text. Empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlertFields")]
pub struct Alert {
    title: String,
    summary: Option<String>,
    description: Option<String>,
    severity: Severity,
    status: AlertStatus,
    timestamp: Option<String>,
}

impl Alert {
    /// Starts building an alert with the given title.
    #[must_use]
    pub fn builder(title: impl Into<String>) -> AlertBuilder {
        AlertBuilder::new(title)
    }

    /// The alert title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Short-form description, if any.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Long-form description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The alert severity.
    #[must_use]
    pub const fn severity(&self) -> &Severity {
        &self.severity
    }

    /// The alert status.
    #[must_use]
    pub const fn status(&self) -> AlertStatus {
        self.status
    }

    /// The raw timestamp supplied by the source, unparsed.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

/// Builder for [`Alert`].
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    title: String,
    summary: Option<String>,
    description: Option<String>,
    severity: Severity,
    status: AlertStatus,
    timestamp: Option<String>,
}

impl AlertBuilder {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            description: None,
            severity: Severity::default(),
            status: AlertStatus::default(),
            timestamp: None,
        }
    }

    /// Sets the short-form summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the long-form description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn severity(mut self, severity: impl Into<Severity>) -> Self {
        self.severity = severity.into();
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn status(mut self, status: AlertStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the raw ISO-8601 timestamp.
    #[must_use]
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Validates and builds the alert.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidAlert` if the title is empty or neither
    /// summary nor description carries text.
    pub fn build(self) -> Result<Alert> {
        if self.title.trim().is_empty() {
            return Err(NotifyError::InvalidAlert {
                reason: "title cannot be empty".to_string(),
            });
        }

        let summary = non_empty(self.summary);
        let description = non_empty(self.description);
        if summary.is_none() && description.is_none() {
            return Err(NotifyError::InvalidAlert {
                reason: "Either 'summary' or 'description' must be provided".to_string(),
            });
        }

        Ok(Alert {
            title: self.title,
            summary,
            description,
            severity: self.severity,
            status: self.status,
            timestamp: non_empty(self.timestamp),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Wire shape of an alert before validation.
#[derive(Debug, Deserialize)]
struct AlertFields {
    title: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    status: AlertStatus,
    #[serde(default)]
    timestamp: Option<String>,
}

impl TryFrom<AlertFields> for Alert {
    type Error = NotifyError;

    fn try_from(fields: AlertFields) -> Result<Self> {
        let mut builder = Alert::builder(fields.title)
            .severity(fields.severity)
            .status(fields.status);
        builder.summary = fields.summary;
        builder.description = fields.description;
        builder.timestamp = fields.timestamp;
        builder.build()
    }
}
