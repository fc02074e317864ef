use ephemeral_env_core::contract::AuthorizerResponse;
use serde_json::{Map, Value};
use tracing::{info, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Placeholder gatekeeper: any non-blank `x-api-key` header is accepted.
/// Header names are matched case-insensitively.
pub fn authorize(headers: &Map<String, Value>) -> AuthorizerResponse {
    let api_key = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(API_KEY_HEADER))
        .and_then(|(_, value)| value.as_str())
        .filter(|value| !value.trim().is_empty());

    match api_key {
        Some(key) => AuthorizerResponse::allow(key),
        None => AuthorizerResponse::deny(),
    }
}

pub fn handle_authorizer_event(event: &Value) -> AuthorizerResponse {
    let response = match event.get("headers") {
        None | Some(Value::Null) => authorize(&Map::new()),
        Some(Value::Object(headers)) => authorize(headers),
        Some(_) => {
            warn!(
                event = "authorizer.malformed_request",
                "headers must be a JSON object"
            );
            AuthorizerResponse::failed()
        }
    };

    let route = event
        .get("routeKey")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(
        event = "authorizer.decided",
        route,
        authorized = response.is_authorized,
    );
    response
}
