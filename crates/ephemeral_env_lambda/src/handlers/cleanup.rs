use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use ephemeral_env_core::config::{CleanupConfig, ConfigError};
use ephemeral_env_core::contract::{CleanupAction, CleanupReport, ResourceKind, SKIPPED_REASON};
use tracing::{error, info};

use crate::adapters::inventory::{ObjectContainers, ResourceCollection, TableCatalog};
use crate::handlers::age::is_environment_old;
use crate::handlers::panic_message;
use crate::handlers::response::{
    configuration_error_response, success_response, ApiGatewayResponse,
};
use crate::handlers::sweep::{sweep_object_store, sweep_resources, SweepResult};

/// The provider services a cleanup sweeps, one seam per resource kind.
#[derive(Clone, Copy)]
pub struct CleanupTargets<'a> {
    pub tables: &'a dyn ResourceCollection,
    pub table_catalog: &'a dyn TableCatalog,
    pub buckets: &'a dyn ResourceCollection,
    pub bucket_contents: &'a dyn ObjectContainers,
    pub event_buses: &'a dyn ResourceCollection,
    pub log_groups: &'a dyn ResourceCollection,
}

impl CleanupTargets<'_> {
    fn sweep(&self, kind: ResourceKind, environment_prefix: &str, result: &mut SweepResult) {
        match kind {
            ResourceKind::Table => sweep_resources(kind, self.tables, environment_prefix, result),
            ResourceKind::ObjectStore => sweep_object_store(
                self.buckets,
                self.bucket_contents,
                environment_prefix,
                result,
            ),
            ResourceKind::EventBus => {
                sweep_resources(kind, self.event_buses, environment_prefix, result)
            }
            ResourceKind::LogGroup => {
                sweep_resources(kind, self.log_groups, environment_prefix, result)
            }
        }
    }
}

/// Runs one age-gated cleanup of the environment named by the configured prefix.
///
/// Returns `Err` only for a blank prefix. Every other outcome, including a
/// sweep aborted by an unexpected failure, is described by the report.
pub fn run_cleanup(
    config: &CleanupConfig,
    targets: &CleanupTargets<'_>,
    now: DateTime<Utc>,
) -> Result<CleanupReport, ConfigError> {
    let environment_prefix = config.environment_prefix.as_str();
    if environment_prefix.trim().is_empty() {
        return Err(ConfigError::MissingEnvironmentPrefix);
    }

    info!(
        event = "cleanup.started",
        prefix = environment_prefix,
        auto_destroy_hours = config.auto_destroy_hours,
    );

    let mut report = CleanupReport {
        environment_prefix: environment_prefix.to_string(),
        auto_destroy_hours: config.auto_destroy_hours,
        cleanup_timestamp: now.to_rfc3339(),
        action: CleanupAction::Completed,
        reason: None,
        error: None,
        resources_cleaned: Vec::new(),
        warnings: Vec::new(),
    };

    if !is_environment_old(
        targets.tables,
        targets.table_catalog,
        environment_prefix,
        config.auto_destroy_hours,
        config.age_check_policy,
        now,
    ) {
        info!(event = "cleanup.skipped", prefix = environment_prefix);
        report.action = CleanupAction::Skipped;
        report.reason = Some(SKIPPED_REASON.to_string());
        return Ok(report);
    }

    for kind in ResourceKind::SWEEP_ORDER {
        let mut swept = SweepResult::default();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            targets.sweep(kind, environment_prefix, &mut swept)
        }));
        report.resources_cleaned.extend(swept.outcomes);
        report.warnings.extend(swept.warning);

        if let Err(payload) = outcome {
            let message = format!("Cleanup failed: {}", panic_message(payload.as_ref()));
            error!(
                event = "cleanup.failed",
                prefix = environment_prefix,
                kind = %kind,
                error = %message,
            );
            report.action = CleanupAction::Failed;
            report.error = Some(message);
            return Ok(report);
        }
    }

    info!(
        event = "cleanup.completed",
        prefix = environment_prefix,
        attempted = report.resources_cleaned.len(),
        errors = report.error_count(),
        warnings = report.warnings.len(),
    );
    Ok(report)
}

pub fn handle_cleanup_event(
    config: Result<CleanupConfig, ConfigError>,
    targets: &CleanupTargets<'_>,
    now: DateTime<Utc>,
) -> ApiGatewayResponse {
    let report = match config.and_then(|config| run_cleanup(&config, targets, now)) {
        Ok(report) => report,
        Err(config_error) => {
            error!(event = "cleanup.misconfigured", error = %config_error);
            return configuration_error_response(400, &config_error.to_string());
        }
    };

    let status_code = match report.action {
        CleanupAction::Failed => 500,
        CleanupAction::Skipped | CleanupAction::Completed => 200,
    };
    success_response(status_code, report)
}
