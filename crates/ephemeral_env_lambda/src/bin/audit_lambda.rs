use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use ephemeral_env_core::config::AuditConfig;
use ephemeral_env_core::contract::AuditRecord;
use ephemeral_env_lambda::adapters::audit_store::AuditStore;
use ephemeral_env_lambda::handlers::audit::handle_audit_event;
use ephemeral_env_lambda::handlers::response::ApiGatewayResponse;
use ephemeral_env_lambda::logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info_span;

struct DynamoDbAuditStore {
    client: aws_sdk_dynamodb::Client,
}

impl AuditStore for DynamoDbAuditStore {
    fn put_record(&self, table_name: &str, record: &AuditRecord) -> Result<(), String> {
        let client = self.client.clone();
        let table = table_name.to_string();
        let record = record.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table)
                    .item("event_id", AttributeValue::S(record.event_id))
                    .item("timestamp", AttributeValue::S(record.timestamp))
                    .item("event_type", AttributeValue::S(record.event_type))
                    .item("source", AttributeValue::S(record.source))
                    .item("detail", AttributeValue::S(record.detail))
                    .item("ttl", AttributeValue::N(record.ttl.to_string()))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to write audit record: {}",
                            aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoDbAuditStore {
        client: aws_sdk_dynamodb::Client::new(&aws_config),
    };

    let span = info_span!("audit_request", request_id = %event.context.request_id);
    Ok(span.in_scope(|| {
        handle_audit_event(&event.payload, AuditConfig::from_env(), &store, Utc::now())
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
