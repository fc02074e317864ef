use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SKIPPED_REASON: &str = "Environment not old enough for cleanup";
pub const AUDIT_TTL_DAYS: i64 = 90;
pub const UNKNOWN_EVENT_FIELD: &str = "Unknown";
pub const INVALID_API_KEY_MARKER: &str = "invalid";
pub const AUTHORIZATION_FAILED: &str = "Authorization failed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    #[serde(rename = "dynamodb_table")]
    Table,
    #[serde(rename = "s3_bucket")]
    ObjectStore,
    #[serde(rename = "eventbridge_bus")]
    EventBus,
    #[serde(rename = "cloudwatch_log_group")]
    LogGroup,
}

impl ResourceKind {
    /// Order in which sweeps run and in which their outcomes appear in a report.
    pub const SWEEP_ORDER: [ResourceKind; 4] = [
        ResourceKind::Table,
        ResourceKind::ObjectStore,
        ResourceKind::EventBus,
        ResourceKind::LogGroup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "dynamodb_table",
            Self::ObjectStore => "s3_bucket",
            Self::EventBus => "eventbridge_bus",
            Self::LogGroup => "cloudwatch_log_group",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Deleted,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceOutcome {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourceOutcome {
    pub fn deleted(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            status: OutcomeStatus::Deleted,
            error: None,
        }
    }

    pub fn failed(kind: ResourceKind, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            status: OutcomeStatus::Error,
            error: Some(error.into()),
        }
    }
}

/// A sweep whose listing call failed and therefore attempted no deletions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepWarning {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CleanupAction {
    Skipped,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub environment_prefix: String,
    pub auto_destroy_hours: u64,
    pub cleanup_timestamp: String,
    pub action: CleanupAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub resources_cleaned: Vec<ResourceOutcome>,
    #[serde(default)]
    pub warnings: Vec<SweepWarning>,
}

impl CleanupReport {
    pub fn outcomes_of(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceOutcome> {
        self.resources_cleaned
            .iter()
            .filter(move |outcome| outcome.kind == kind)
    }

    pub fn error_count(&self) -> usize {
        self.resources_cleaned
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Error)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub event_id: String,
    pub timestamp: String,
    pub event_type: String,
    pub source: String,
    pub detail: String,
    pub ttl: i64,
}

impl AuditRecord {
    /// Copies the bus event's routing fields and payload into an audit record
    /// that expires `AUDIT_TTL_DAYS` after `now`.
    pub fn from_event(event: &Value, event_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let detail = match event.get("detail") {
            None | Some(Value::Null) => "{}".to_string(),
            Some(value) => value.to_string(),
        };

        Self {
            event_id: event_id.into(),
            timestamp: now.to_rfc3339(),
            event_type: string_field_or_unknown(event, "detail-type"),
            source: string_field_or_unknown(event, "source"),
            detail,
            ttl: (now + Duration::days(AUDIT_TTL_DAYS)).timestamp(),
        }
    }
}

fn string_field_or_unknown(event: &Value, field: &str) -> String {
    event
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_EVENT_FIELD)
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub is_authorized: bool,
    pub context: BTreeMap<String, String>,
}

impl AuthorizerResponse {
    pub fn allow(api_key: impl Into<String>) -> Self {
        Self {
            is_authorized: true,
            context: BTreeMap::from([("apiKey".to_string(), api_key.into())]),
        }
    }

    pub fn deny() -> Self {
        Self {
            is_authorized: false,
            context: BTreeMap::from([("apiKey".to_string(), INVALID_API_KEY_MARKER.to_string())]),
        }
    }

    pub fn failed() -> Self {
        Self {
            is_authorized: false,
            context: BTreeMap::from([("error".to_string(), AUTHORIZATION_FAILED.to_string())]),
        }
    }
}
