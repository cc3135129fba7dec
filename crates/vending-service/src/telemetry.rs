//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor a configured filter is set.
pub const DEFAULT_FILTER: &str = "info,vending=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Filter Precedence
/// 1. `RUST_LOG`, e.g. `RUST_LOG=vending_service=trace`
/// 2. `configured` (from `VENDING_LOG`)
/// 3. [`DEFAULT_FILTER`]
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
