use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use ephemeral_env_core::config::AgeCheckPolicy;
use ephemeral_env_core::contract::ResourceKind;
use ephemeral_env_core::matching::belongs_to_environment;
use tracing::{info, warn};

use crate::adapters::inventory::{ResourceCollection, TableCatalog};
use crate::handlers::panic_message;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Decides whether the environment behind `environment_prefix` has outlived
/// `threshold_hours`, using the first matching table as a proxy for its age.
///
/// No matching table means there is nothing to protect, so the environment
/// counts as old. The threshold is inclusive. When the tables cannot be
/// inspected the outcome is whatever `policy` prescribes.
pub fn is_environment_old(
    tables: &dyn ResourceCollection,
    catalog: &dyn TableCatalog,
    environment_prefix: &str,
    threshold_hours: u64,
    policy: AgeCheckPolicy,
    now: DateTime<Utc>,
) -> bool {
    let inspection = panic::catch_unwind(AssertUnwindSafe(|| {
        environment_age_hours(tables, catalog, environment_prefix, now)
    }))
    .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));

    match inspection {
        Ok(None) => {
            info!(
                event = "cleanup.age_check.no_proxy_table",
                prefix = environment_prefix,
                "no tables found for environment, considering for cleanup"
            );
            true
        }
        Ok(Some(age_hours)) => {
            let old_enough = age_hours >= threshold_hours as f64;
            info!(
                event = "cleanup.age_check.evaluated",
                prefix = environment_prefix,
                age_hours = %format!("{age_hours:.2}"),
                threshold_hours,
                old_enough,
            );
            old_enough
        }
        Err(error) => {
            let assume_old = policy.assume_old();
            warn!(
                event = "cleanup.age_check.inspection_failed",
                prefix = environment_prefix,
                error = %error,
                policy = ?policy,
                proceeding = assume_old,
            );
            assume_old
        }
    }
}

/// Hours elapsed since the proxy table was created, or `None` when no table
/// belongs to the environment.
pub fn environment_age_hours(
    tables: &dyn ResourceCollection,
    catalog: &dyn TableCatalog,
    environment_prefix: &str,
    now: DateTime<Utc>,
) -> Result<Option<f64>, String> {
    let proxy = tables
        .list()
        .map_err(|error| format!("failed to list tables: {error}"))?
        .into_iter()
        .find(|table| belongs_to_environment(ResourceKind::Table, &table.name, environment_prefix));

    let Some(proxy) = proxy else {
        return Ok(None);
    };

    let created_at = match proxy.created_at {
        Some(value) => value,
        None => catalog
            .creation_time(&proxy.name)
            .map_err(|error| format!("failed to describe table {}: {error}", proxy.name))?,
    };

    let elapsed = now.signed_duration_since(created_at);
    Ok(Some(elapsed.num_milliseconds() as f64 / MILLIS_PER_HOUR))
}
