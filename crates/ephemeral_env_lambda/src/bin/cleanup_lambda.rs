use std::future::Future;

use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use chrono::{DateTime, Utc};
use ephemeral_env_core::config::CleanupConfig;
use ephemeral_env_lambda::adapters::inventory::{
    ObjectContainers, ResourceCollection, ResourceSummary, TableCatalog,
};
use ephemeral_env_lambda::handlers::cleanup::{handle_cleanup_event, CleanupTargets};
use ephemeral_env_lambda::handlers::response::ApiGatewayResponse;
use ephemeral_env_lambda::logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info_span;

const S3_DELETE_BATCH_SIZE: usize = 1_000;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn from_smithy_time(value: &aws_sdk_dynamodb::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

struct DynamoDbTables {
    client: aws_sdk_dynamodb::Client,
}

impl ResourceCollection for DynamoDbTables {
    fn list(&self) -> Result<Vec<ResourceSummary>, String> {
        let client = self.client.clone();
        block_on(async move {
            let mut tables = Vec::new();
            let mut start_table: Option<String> = None;
            loop {
                let output = client
                    .list_tables()
                    .set_exclusive_start_table_name(start_table.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to list dynamodb tables: {}",
                            aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                        )
                    })?;
                tables.extend(
                    output
                        .table_names()
                        .iter()
                        .map(|name| ResourceSummary::named(name.as_str())),
                );
                match output.last_evaluated_table_name() {
                    Some(name) => start_table = Some(name.to_string()),
                    None => break,
                }
            }
            Ok(tables)
        })
    }

    fn delete(&self, name: &str) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = name.to_string();
        block_on(async move {
            client
                .delete_table()
                .table_name(table_name)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to delete dynamodb table: {}",
                        aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

impl TableCatalog for DynamoDbTables {
    fn creation_time(&self, table_name: &str) -> Result<DateTime<Utc>, String> {
        let client = self.client.clone();
        let table = table_name.to_string();
        block_on(async move {
            let output = client
                .describe_table()
                .table_name(table.clone())
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to describe dynamodb table: {}",
                        aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                    )
                })?;
            output
                .table()
                .and_then(|description| description.creation_date_time())
                .and_then(from_smithy_time)
                .ok_or_else(|| format!("table {table} has no creation time"))
        })
    }
}

struct S3Buckets {
    client: aws_sdk_s3::Client,
}

impl ResourceCollection for S3Buckets {
    fn list(&self) -> Result<Vec<ResourceSummary>, String> {
        let client = self.client.clone();
        block_on(async move {
            let mut buckets = Vec::new();
            let mut continuation_token: Option<String> = None;
            loop {
                let output = client
                    .list_buckets()
                    .set_continuation_token(continuation_token.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to list s3 buckets: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })?;
                buckets.extend(
                    output
                        .buckets()
                        .iter()
                        .filter_map(|bucket| bucket.name().map(ResourceSummary::named)),
                );
                match output.continuation_token() {
                    Some(token) => continuation_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(buckets)
        })
    }

    fn delete(&self, name: &str) -> Result<(), String> {
        let client = self.client.clone();
        let bucket = name.to_string();
        block_on(async move {
            client
                .delete_bucket()
                .bucket(bucket)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to delete s3 bucket: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

impl ObjectContainers for S3Buckets {
    fn list_contents(&self, container: &str) -> Result<Vec<String>, String> {
        let client = self.client.clone();
        let bucket = container.to_string();
        block_on(async move {
            let mut keys = Vec::new();
            let mut continuation_token: Option<String> = None;
            loop {
                let output = client
                    .list_objects_v2()
                    .bucket(bucket.clone())
                    .set_continuation_token(continuation_token.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to list objects: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })?;
                keys.extend(
                    output
                        .contents()
                        .iter()
                        .filter_map(|object| object.key().map(str::to_string)),
                );
                match output.next_continuation_token() {
                    Some(token) if output.is_truncated().unwrap_or(false) => {
                        continuation_token = Some(token.to_string());
                    }
                    _ => break,
                }
            }
            Ok(keys)
        })
    }

    fn delete_contents(&self, container: &str, keys: &[String]) -> Result<(), String> {
        let client = self.client.clone();
        let bucket = container.to_string();
        let keys = keys.to_vec();
        block_on(async move {
            for batch in keys.chunks(S3_DELETE_BATCH_SIZE) {
                let objects = batch
                    .iter()
                    .map(|key| ObjectIdentifier::builder().key(key).build())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|error| format!("invalid object key: {error}"))?;
                let delete = Delete::builder()
                    .set_objects(Some(objects))
                    .quiet(true)
                    .build()
                    .map_err(|error| format!("invalid delete request: {error}"))?;

                let output = client
                    .delete_objects()
                    .bucket(bucket.clone())
                    .delete(delete)
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to delete objects: {}",
                            aws_sdk_s3::error::DisplayErrorContext(&error)
                        )
                    })?;
                if let Some(first) = output.errors().first() {
                    return Err(format!(
                        "failed to delete {} objects, first: {} ({})",
                        output.errors().len(),
                        first.key().unwrap_or("<unknown>"),
                        first.message().unwrap_or("no message"),
                    ));
                }
            }
            Ok(())
        })
    }
}

struct EventBridgeBuses {
    client: aws_sdk_eventbridge::Client,
}

impl ResourceCollection for EventBridgeBuses {
    fn list(&self) -> Result<Vec<ResourceSummary>, String> {
        let client = self.client.clone();
        block_on(async move {
            let mut buses = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let output = client
                    .list_event_buses()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to list event buses: {}",
                            aws_sdk_eventbridge::error::DisplayErrorContext(&error)
                        )
                    })?;
                buses.extend(
                    output
                        .event_buses()
                        .iter()
                        .filter_map(|bus| bus.name().map(ResourceSummary::named)),
                );
                match output.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(buses)
        })
    }

    fn delete(&self, name: &str) -> Result<(), String> {
        let client = self.client.clone();
        let bus_name = name.to_string();
        block_on(async move {
            client
                .delete_event_bus()
                .name(bus_name)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to delete event bus: {}",
                        aws_sdk_eventbridge::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

struct CloudWatchLogGroups {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl ResourceCollection for CloudWatchLogGroups {
    fn list(&self) -> Result<Vec<ResourceSummary>, String> {
        let client = self.client.clone();
        block_on(async move {
            let mut groups = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let output = client
                    .describe_log_groups()
                    .set_next_token(next_token.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to describe log groups: {}",
                            aws_sdk_cloudwatchlogs::error::DisplayErrorContext(&error)
                        )
                    })?;
                groups.extend(
                    output
                        .log_groups()
                        .iter()
                        .filter_map(|group| group.log_group_name().map(ResourceSummary::named)),
                );
                match output.next_token() {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
            Ok(groups)
        })
    }

    fn delete(&self, name: &str) -> Result<(), String> {
        let client = self.client.clone();
        let group_name = name.to_string();
        block_on(async move {
            client
                .delete_log_group()
                .log_group_name(group_name)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to delete log group: {}",
                        aws_sdk_cloudwatchlogs::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let config = CleanupConfig::from_env();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let tables = DynamoDbTables {
        client: aws_sdk_dynamodb::Client::new(&aws_config),
    };
    let buckets = S3Buckets {
        client: aws_sdk_s3::Client::new(&aws_config),
    };
    let event_buses = EventBridgeBuses {
        client: aws_sdk_eventbridge::Client::new(&aws_config),
    };
    let log_groups = CloudWatchLogGroups {
        client: aws_sdk_cloudwatchlogs::Client::new(&aws_config),
    };
    let targets = CleanupTargets {
        tables: &tables,
        table_catalog: &tables,
        buckets: &buckets,
        bucket_contents: &buckets,
        event_buses: &event_buses,
        log_groups: &log_groups,
    };

    let span = info_span!("cleanup_request", request_id = %event.context.request_id);
    Ok(span.in_scope(|| handle_cleanup_event(config, &targets, Utc::now())))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
