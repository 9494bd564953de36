//! Log output for the CLI.

use tracing_subscriber::EnvFilter;

/// Install a plain `fmt` subscriber.
///
/// `RUST_LOG` is folded into `log_level` by the config loader, so the
/// configured value is the only input here. An unparsable filter falls
/// back to `info`.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
