//! HTTP request handlers for the relay.
//!
//! Bodies are taken as raw JSON values so that a malformed body and an
//! invalid alert can be told apart: the first answers 400, the second 422.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use relay_notify::{Alert, AlertmanagerPayload, HomeAssistantNotification, Transport};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ServerError, ServerResult};
use crate::state::RelayState;

/// Body returned by the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
}

/// Body returned once every batch has been delivered.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Always `ok`.
    pub status: &'static str,
}

impl AcceptedResponse {
    const OK: Self = Self { status: "ok" };
}

/// Handle GET /health.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Handle POST /discord-alert: one canonical alert or a list of them.
pub async fn unified_alert<T: Transport>(
    State(state): State<Arc<RelayState<T>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<AcceptedResponse>> {
    let alerts = parse_alerts(json_body(body)?)?;
    debug!(count = alerts.len(), "received unified alerts");

    state.notifier().send(alerts).await?;

    Ok(Json(AcceptedResponse::OK))
}

/// Handle POST /webhook: a Prometheus Alertmanager notification.
pub async fn alertmanager_webhook<T: Transport>(
    State(state): State<Arc<RelayState<T>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<AcceptedResponse>> {
    let payload: AlertmanagerPayload = serde_json::from_value(json_body(body)?)
        .map_err(|e| ServerError::InvalidRequest(format!("invalid Alertmanager payload: {e}")))?;
    debug!(count = payload.alerts.len(), "received Alertmanager webhook");

    state.notifier().send_single(payload).await?;

    Ok(Json(AcceptedResponse::OK))
}

/// Handle POST /webhook/homeassistant: a Home Assistant notification.
pub async fn homeassistant_webhook<T: Transport>(
    State(state): State<Arc<RelayState<T>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<AcceptedResponse>> {
    let notification: HomeAssistantNotification = serde_json::from_value(json_body(body)?)
        .map_err(|e| {
            ServerError::InvalidRequest(format!("invalid Home Assistant notification: {e}"))
        })?;
    debug!("received Home Assistant notification");

    state.notifier().send_single(notification).await?;

    Ok(Json(AcceptedResponse::OK))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ServerResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::InvalidRequest(rejection.body_text()))
}

/// Reads a single alert object or a list of alert objects.
fn parse_alerts(value: Value) -> ServerResult<Vec<Alert>> {
    let parsed = match value {
        Value::Array(_) => serde_json::from_value::<Vec<Alert>>(value),
        Value::Object(_) => serde_json::from_value::<Alert>(value).map(|alert| vec![alert]),
        _ => {
            return Err(ServerError::InvalidRequest(
                "expected an alert object or a list of alerts".to_string(),
            ));
        }
    };
    parsed.map_err(|e| ServerError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_single_alert() {
        let alerts = parse_alerts(json!({"title": "DiskFull", "summary": "99%"})).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title(), "DiskFull");
    }

    #[test]
    fn parse_alert_list() {
        let alerts = parse_alerts(json!([
            {"title": "A", "summary": "a"},
            {"title": "B", "description": "b", "severity": "critical"}
        ]))
        .unwrap();

        let titles: Vec<_> = alerts.iter().map(Alert::title).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn parse_empty_list() {
        assert!(parse_alerts(json!([])).unwrap().is_empty());
    }

    #[test]
    fn missing_content_is_validation_error() {
        let err = parse_alerts(json!({"title": "NoBody"})).unwrap_err();

        match err {
            ServerError::Validation(message) => {
                assert!(message.contains("Either 'summary' or 'description' must be provided"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn invalid_element_rejects_whole_list() {
        let err = parse_alerts(json!([
            {"title": "Good", "summary": "s"},
            {"title": "", "summary": "s"}
        ]))
        .unwrap_err();

        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[test]
    fn scalar_body_is_invalid_request() {
        let err = parse_alerts(json!("just a string")).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }

    mod delivery_failure_tests {
        use super::*;
        use parking_lot::Mutex;
        use relay_notify::{DeliveryError, Notifier, NotifierConfig, WebhookMessage};
        use std::io;

        struct RefusingTransport;

        impl Transport for RefusingTransport {
            async fn deliver(&self, _message: &WebhookMessage) -> Result<(), DeliveryError> {
                Err(DeliveryError::Unreachable {
                    reason: "connection refused".to_string(),
                })
            }
        }

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        #[tokio::test]
        async fn failure_is_logged_once() {
            let captured = Captured::default();
            let writer = captured.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            let _guard = tracing::subscriber::set_default(subscriber);

            let notifier = Notifier::new(RefusingTransport, NotifierConfig::default());
            let state = Arc::new(RelayState::new(notifier, "test-relay"));
            let body = Ok(Json(json!({"title": "T", "summary": "s"})));

            let result = unified_alert(State(state), body).await;

            assert!(matches!(
                result,
                Err(ServerError::Notify(relay_notify::NotifyError::Delivery(_)))
            ));
            let logs = String::from_utf8(captured.0.lock().clone()).unwrap();
            assert_eq!(logs.lines().filter(|l| l.contains("ERROR")).count(), 1, "{logs}");
        }
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "healthy");
    }
}
