use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}
