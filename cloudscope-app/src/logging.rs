//! Tracing initialisation.

use cloudscope_store::LogLevel;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Returns false if a subscriber
/// was already installed, in which case nothing changes.
pub fn init_tracing(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Our crates log at `level`; dependencies only warn.
fn filter_directive(level: LogLevel) -> String {
    format!("warn,cloudscope={level}")
}
