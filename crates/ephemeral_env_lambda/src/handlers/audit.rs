use chrono::{DateTime, Utc};
use ephemeral_env_core::config::{AuditConfig, ConfigError};
use ephemeral_env_core::contract::AuditRecord;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::adapters::audit_store::AuditStore;
use crate::handlers::response::{
    configuration_error_response, error_response, success_response, ApiGatewayResponse,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditReceipt {
    pub event_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct AuditAcceptedResponse {
    message: String,
    event_id: String,
}

/// Writes one audit record for `event` under a fresh identifier.
pub fn record_event(
    event: &Value,
    table_name: &str,
    store: &dyn AuditStore,
    now: DateTime<Utc>,
) -> Result<AuditReceipt, String> {
    let record = AuditRecord::from_event(event, Uuid::new_v4().to_string(), now);
    store.put_record(table_name, &record)?;

    info!(
        event = "audit.recorded",
        event_id = %record.event_id,
        event_type = %record.event_type,
        source = %record.source,
    );
    Ok(AuditReceipt {
        event_id: record.event_id,
        timestamp: record.timestamp,
    })
}

pub fn handle_audit_event(
    event: &Value,
    config: Result<AuditConfig, ConfigError>,
    store: &dyn AuditStore,
    now: DateTime<Utc>,
) -> ApiGatewayResponse {
    debug!(event = "audit.received", payload = %event);

    let config = match config {
        Ok(config) => config,
        Err(config_error) => {
            error!(event = "audit.misconfigured", error = %config_error);
            return configuration_error_response(500, &config_error.to_string());
        }
    };

    match record_event(event, &config.table_name, store, now) {
        Ok(receipt) => success_response(
            200,
            AuditAcceptedResponse {
                message: "Event processed successfully".to_string(),
                event_id: receipt.event_id,
            },
        ),
        Err(store_error) => {
            error!(event = "audit.write_failed", error = %store_error);
            error_response(
                500,
                json!({
                    "error": "Event processing failed",
                    "message": store_error,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use ephemeral_env_core::contract::UNKNOWN_EVENT_FIELD;

    use super::*;
    use crate::test_helpers::{fixed_now, RecordingAuditStore};

    fn audit_table() -> Result<AuditConfig, ConfigError> {
        Ok(AuditConfig {
            table_name: "audit-log".to_string(),
        })
    }

    fn bus_event() -> Value {
        json!({
            "version": "0",
            "detail-type": "OrderCreated",
            "source": "orders.service",
            "detail": {"order_id": "o-1"},
        })
    }

    #[test]
    fn records_event_and_returns_identifier() {
        let store = RecordingAuditStore::new();

        let response = handle_audit_event(&bus_event(), audit_table(), &store, fixed_now());

        assert_eq!(response.status_code, 200);
        let body = response.body_json().expect("body should be json");
        assert_eq!(body["message"], "Event processed successfully");

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        let (table, record) = &writes[0];
        assert_eq!(table, "audit-log");
        assert_eq!(body["eventId"], record.event_id.as_str());
        assert!(Uuid::parse_str(&record.event_id).is_ok());
        assert_eq!(record.event_type, "OrderCreated");
    }

    #[test]
    fn every_event_gets_a_fresh_identifier() {
        let store = RecordingAuditStore::new();

        let first = record_event(&bus_event(), "audit-log", &store, fixed_now())
            .expect("first write should succeed");
        let second = record_event(&bus_event(), "audit-log", &store, fixed_now())
            .expect("second write should succeed");

        assert_ne!(first.event_id, second.event_id);
        assert_eq!(first.timestamp, fixed_now().to_rfc3339());
    }

    #[test]
    fn sparse_events_are_recorded_with_defaults() {
        let store = RecordingAuditStore::new();

        let response = handle_audit_event(
            &json!("not an object"),
            audit_table(),
            &store,
            fixed_now(),
        );

        assert_eq!(response.status_code, 200);
        let (_, record) = &store.writes()[0];
        assert_eq!(record.source, UNKNOWN_EVENT_FIELD);
        assert_eq!(record.detail, "{}");
    }

    #[test]
    fn missing_table_is_a_configuration_error() {
        let store = RecordingAuditStore::new();

        let response = handle_audit_event(
            &bus_event(),
            Err(ConfigError::MissingAuditTable),
            &store,
            fixed_now(),
        );

        assert_eq!(response.status_code, 500);
        let body = response.body_json().expect("body should be json");
        assert_eq!(body["error"], "configuration_error");
        assert_eq!(body["message"], "AUDIT_TABLE_NAME must be configured");
        assert!(store.writes().is_empty());
    }

    #[test]
    fn store_failure_is_reported() {
        let store = RecordingAuditStore::failing("ProvisionedThroughputExceeded");

        let response = handle_audit_event(&bus_event(), audit_table(), &store, fixed_now());

        assert_eq!(response.status_code, 500);
        let body = response.body_json().expect("body should be json");
        assert_eq!(body["error"], "Event processing failed");
        assert_eq!(body["message"], "ProvisionedThroughputExceeded");
    }
}
