use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "info,html5ever=error,selectors=error,hyper=warn,reqwest=info";

/// Installs the global subscriber. `LOG_LEVEL` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(ErrorLayer::default())
        .init();
}
