//! Error types for the relay server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_notify::NotifyError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for relay server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the relay server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Invalid settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request body is not JSON or lacks the expected structure.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request is well formed but an alert in it is not valid.
    #[error("{0}")]
    Validation(String),

    /// Formatting or delivery failed.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status and machine-readable error type for this error.
    #[must_use]
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Validation(_) | Self::Notify(NotifyError::InvalidAlert { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
            }
            Self::Notify(NotifyError::Delivery(err)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind())
            }
            Self::BindFailed(_, _) | Self::Config(_) | Self::Notify(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use relay_notify::DeliveryError;

    async fn body_json(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_request_is_bad_request() {
        let (status, json) = body_json(ServerError::InvalidRequest("not JSON".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_request");
        assert_eq!(json["message"], "invalid request: not JSON");
    }

    #[tokio::test]
    async fn validation_is_unprocessable() {
        let (status, json) = body_json(ServerError::Validation(
            "Either 'summary' or 'description' must be provided".to_string(),
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "validation_error");
        assert_eq!(
            json["message"],
            "Either 'summary' or 'description' must be provided"
        );
    }

    #[tokio::test]
    async fn delivery_failure_is_server_error() {
        let err = ServerError::from(NotifyError::from(DeliveryError::ProviderRejected {
            status: 404,
            detail: "Unknown Webhook".to_string(),
        }));
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "provider_rejected");
        assert_eq!(json["message"], "discord API error (404): Unknown Webhook");
    }

    #[tokio::test]
    async fn timeout_reports_kind() {
        let err = ServerError::from(NotifyError::from(DeliveryError::Timeout {
            timeout_secs: 10,
        }));
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "timeout");
    }

    #[tokio::test]
    async fn internal_error_response() {
        let (status, json) = body_json(ServerError::Internal("boom".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "internal_error");
    }

    #[test]
    fn invalid_alert_maps_to_validation() {
        let err = ServerError::from(NotifyError::InvalidAlert {
            reason: "title cannot be empty".to_string(),
        });
        assert_eq!(err.status_and_type().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn error_display() {
        let err = ServerError::Config("bad url".to_string());
        assert_eq!(err.to_string(), "invalid configuration: bad url");
    }
}
