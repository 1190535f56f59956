pub mod cli;
pub mod config;
pub mod pipeline;
pub mod pipeline_config;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once is
/// harmless; only the first subscriber is kept.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
