use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber used by every binary.
///
/// Verbosity follows `RUST_LOG` and defaults to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        eprintln!("[WARN] a global logging subscriber was already set");
    }
}
