use tracing_subscriber::EnvFilter;

/// Initialise logging. `--debug` selects the `debug` level and lets
/// `RUST_LOG` override it; otherwise the level is fixed at `info`.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
