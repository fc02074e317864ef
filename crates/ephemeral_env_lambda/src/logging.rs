use tracing_subscriber::EnvFilter;

/// Installs the JSON log subscriber used by every Lambda binary.
///
/// CloudWatch timestamps each line itself, so events are emitted without
/// one. The filter honours `RUST_LOG` and falls back to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(true)
        .without_time()
        .try_init();
}
