//! Logging initialization for the batch runner.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
///
/// Logs go to stderr so stdout stays free for piping. Any format other than
/// `json` renders human-readable output.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = config.format.eq_ignore_ascii_case("json");
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
    });
    let pretty_layer = (!json).then(|| {
        fmt::layer()
            .pretty()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
}
