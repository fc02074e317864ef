use ephemeral_env_core::contract::AuthorizerResponse;
use ephemeral_env_lambda::handlers::authorizer::handle_authorizer_event;
use ephemeral_env_lambda::logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info_span;

async fn handle_request(event: LambdaEvent<Value>) -> Result<AuthorizerResponse, Error> {
    let span = info_span!("authorizer_request", request_id = %event.context.request_id);
    Ok(span.in_scope(|| handle_authorizer_event(&event.payload)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
