use std::collections::HashSet;

use ephemeral_env_core::contract::{ResourceKind, ResourceOutcome, SweepWarning};
use ephemeral_env_core::matching::belongs_to_environment;
use tracing::{error, info, warn};

use crate::adapters::inventory::{ObjectContainers, ResourceCollection};

/// Accumulates what a sweep has done so far. Outcomes are pushed as each
/// delete returns, so a sweep interrupted midway still reports its deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub outcomes: Vec<ResourceOutcome>,
    pub warning: Option<SweepWarning>,
}

/// Deletes every resource of `kind` that belongs to the environment, one
/// delete call per resource. Per-resource failures are captured in the
/// outcomes and never stop the sweep.
pub fn sweep_resources(
    kind: ResourceKind,
    collection: &dyn ResourceCollection,
    environment_prefix: &str,
    result: &mut SweepResult,
) {
    sweep_matching(kind, collection, environment_prefix, result, |name| {
        collection.delete(name)
    });
}

/// Buckets must be empty before they can be deleted, so each matching bucket
/// is purged first. Purge failures are logged and the bucket delete is
/// attempted anyway; only the bucket delete decides the outcome.
pub fn sweep_object_store(
    buckets: &dyn ResourceCollection,
    contents: &dyn ObjectContainers,
    environment_prefix: &str,
    result: &mut SweepResult,
) {
    sweep_matching(
        ResourceKind::ObjectStore,
        buckets,
        environment_prefix,
        result,
        |bucket| {
            purge_container(contents, bucket);
            buckets.delete(bucket)
        },
    );
}

fn purge_container(contents: &dyn ObjectContainers, container: &str) {
    let keys = match contents.list_contents(container) {
        Ok(keys) => keys,
        Err(error) => {
            warn!(
                event = "cleanup.sweep.purge_list_failed",
                bucket = container,
                error = %error,
            );
            return;
        }
    };

    if keys.is_empty() {
        return;
    }

    match contents.delete_contents(container, &keys) {
        Ok(()) => info!(
            event = "cleanup.sweep.purged",
            bucket = container,
            objects = keys.len(),
        ),
        Err(error) => warn!(
            event = "cleanup.sweep.purge_failed",
            bucket = container,
            objects = keys.len(),
            error = %error,
        ),
    }
}

fn sweep_matching(
    kind: ResourceKind,
    collection: &dyn ResourceCollection,
    environment_prefix: &str,
    result: &mut SweepResult,
    mut delete: impl FnMut(&str) -> Result<(), String>,
) {
    let resources = match collection.list() {
        Ok(resources) => resources,
        Err(list_error) => {
            error!(
                event = "cleanup.sweep.list_failed",
                kind = %kind,
                error = %list_error,
            );
            result.warning = Some(SweepWarning {
                kind,
                message: format!("Error listing {kind} resources: {list_error}"),
            });
            return;
        }
    };

    let mut seen = HashSet::new();
    let mut attempted = 0usize;
    for resource in resources {
        if !belongs_to_environment(kind, &resource.name, environment_prefix)
            || !seen.insert(resource.name.clone())
        {
            continue;
        }

        attempted += 1;
        info!(event = "cleanup.sweep.deleting", kind = %kind, name = %resource.name);
        let outcome = match delete(&resource.name) {
            Ok(()) => ResourceOutcome::deleted(kind, resource.name),
            Err(delete_error) => {
                error!(
                    event = "cleanup.sweep.delete_failed",
                    kind = %kind,
                    name = %resource.name,
                    error = %delete_error,
                );
                ResourceOutcome::failed(kind, resource.name, delete_error)
            }
        };
        result.outcomes.push(outcome);
    }

    info!(event = "cleanup.sweep.finished", kind = %kind, attempted);
}
