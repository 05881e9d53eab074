//! Structured logging setup.
//!
//! The library only emits `tracing` events. Binaries decide where they go.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info,turnstate=debug`. Calling it twice panics, as with
/// any global subscriber.
///
/// # Example
///
/// ```no_run
/// use turnstate::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("table opening");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,turnstate=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}
