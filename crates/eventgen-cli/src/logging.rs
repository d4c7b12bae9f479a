//! Tracing subscriber setup for the `eventgen` binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `eventgen_compiler=debug`.
pub const LOG_ENV: &str = "EVENTGEN_LOG";

/// Installs a stderr fmt subscriber. `EVENTGEN_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = build_env_filter(verbose);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "eventgen_compiler=debug,eventgen=debug,warn"
    } else {
        "warn"
    }
}
