use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use super::TracingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// default filter. Fails if a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let output = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    let output: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        output.json().with_filter(env_filter).boxed()
    } else {
        output.with_filter(env_filter).boxed()
    };

    tracing_subscriber::registry().with(output).try_init()?;

    tracing::info!(
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        json_format = config.json_format,
        "Tracing initialized"
    );
    Ok(())
}
