use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber at `INFO`, overridable through `RUST_LOG`.
pub fn init_tracing() {
    init_tracing_with_level(LevelFilter::INFO);
}

/// Install the global subscriber with a custom default level.
///
/// `RUST_LOG_FORMAT=json` selects newline-delimited JSON, anything else the
/// compact human format. Calling this twice is a no-op for the second call.
pub fn init_tracing_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
    };

    if let Err(error) = tracing_subscriber::registry().with(log_layer).try_init() {
        warn!("Tracing subscriber already installed: {error}");
    }
}
