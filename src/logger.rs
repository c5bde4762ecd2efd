use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr so stdout carries only the report. The filter is read
/// from `RUST_LOG`, and colors are turned off when `DISABLE_COLOR` is set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let res = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::env::var_os("DISABLE_COLOR").is_none())
        .try_init();
    if let Err(e) = res {
        eprintln!("failed to initialize logging: {e}");
    }
}
