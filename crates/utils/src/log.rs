use std::env;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset or empty.
const DEFAULT_LOG_FILTER: &str = "info,discv5=error";

pub fn init_tracing_logger() {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let env_filter = match rust_log.is_empty() {
        true => EnvFilter::builder().parse_lossy(DEFAULT_LOG_FILTER),
        false => EnvFilter::builder().parse_lossy(rust_log),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(detect_ansi_support())
        .init();
}

/// Whether stdout is a terminal that understands ANSI colors.
pub fn detect_ansi_support() -> bool {
    if !atty::is(atty::Stream::Stdout) {
        return false;
    }
    env::var("TERM")
        .map(|term| term != "dumb")
        .unwrap_or(false)
}
