use tracing_subscriber::EnvFilter;

/// Installs the stderr `fmt` subscriber; `RUST_LOG` overrides the `info`
/// default. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
