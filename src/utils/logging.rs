//! Logging setup for the `sxi` binary using `tracing_subscriber`.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to the embedding application).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `directives` is used.
pub fn setup_logging(directives: &str) {
    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed by an embedding application
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(main_layer)
        .try_init();
}

/// Default filter directives for a given verbosity count
pub fn directives_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
