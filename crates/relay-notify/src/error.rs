//! Error types for the relay-notify crate.

use thiserror::Error;

/// Errors that can occur while building, formatting or delivering alerts.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The alert failed validation and was never formatted.
    #[error("invalid alert: {reason}")]
    InvalidAlert {
        /// The reason the alert is invalid.
        reason: String,
    },

    /// A batch could not be delivered to the webhook.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Invalid notifier or transport configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration is invalid.
        reason: String,
    },
}

impl NotifyError {
    /// Returns the delivery failure, if this error is one.
    #[must_use]
    pub const fn as_delivery(&self) -> Option<&DeliveryError> {
        match self {
            Self::Delivery(err) => Some(err),
            _ => None,
        }
    }
}

/// A failed outbound webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The webhook answered with a non-success status.
    #[error("discord API error ({status}): {detail}")]
    ProviderRejected {
        /// HTTP status code returned by the webhook.
        status: u16,
        /// Error body returned by the webhook (JSON or raw text).
        detail: String,
    },

    /// The webhook call exceeded its time budget.
    #[error("discord webhook request timed out after {timeout_secs}s")]
    Timeout {
        /// The timeout that was exceeded, in seconds.
        timeout_secs: u64,
    },

    /// The webhook could not be reached at all.
    #[error("failed to reach discord webhook: {reason}")]
    Unreachable {
        /// Transport-level failure description.
        reason: String,
    },
}

impl DeliveryError {
    /// Short machine-readable name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProviderRejected { .. } => "provider_rejected",
            Self::Timeout { .. } => "timeout",
            Self::Unreachable { .. } => "unreachable",
        }
    }

    /// Status code reported by the webhook, if it answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderRejected { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Unreachable { .. } => None,
        }
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_alert() {
        let err = NotifyError::InvalidAlert {
            reason: "title cannot be empty".to_string(),
        };
        assert_eq!(err.to_string(), "invalid alert: title cannot be empty");
    }

    #[test]
    fn error_display_provider_rejected() {
        let err = DeliveryError::ProviderRejected {
            status: 400,
            detail: r#"{"message":"Invalid Form Body"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"discord API error (400): {"message":"Invalid Form Body"}"#
        );
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), "provider_rejected");
    }

    #[test]
    fn error_display_timeout() {
        let err = DeliveryError::Timeout { timeout_secs: 10 };
        assert_eq!(
            err.to_string(),
            "discord webhook request timed out after 10s"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn error_display_unreachable() {
        let err = DeliveryError::Unreachable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to reach discord webhook: connection refused"
        );
        assert_eq!(err.kind(), "unreachable");
    }

    #[test]
    fn delivery_error_is_transparent() {
        let err: NotifyError = DeliveryError::Timeout { timeout_secs: 5 }.into();
        assert_eq!(err.to_string(), "discord webhook request timed out after 5s");
        assert!(matches!(
            err.as_delivery(),
            Some(DeliveryError::Timeout { timeout_secs: 5 })
        ));
    }

    #[test]
    fn error_display_invalid_config() {
        let err = NotifyError::InvalidConfig {
            reason: "max_requests must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: max_requests must be at least 1"
        );
        assert!(err.as_delivery().is_none());
    }
}
