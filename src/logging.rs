use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive: `--verbose` beats the configured level, which
/// beats the default of `warn`. `RUST_LOG` overrides all of them at init.
pub fn filter_directive(verbose: bool, configured: Option<&str>) -> String {
    if verbose {
        "plugin_score=debug".to_string()
    } else {
        configured.unwrap_or("warn").to_string()
    }
}

/// Install the global tracing subscriber, logging to stderr so stdout stays
/// clean for scores and JSON.
pub fn init_subscriber(verbose: bool, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, configured)));

    // Already installed is fine
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
