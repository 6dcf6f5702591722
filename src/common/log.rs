use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, registry};
use tracing_tree::HierarchicalLayer;

/// Initializes the global subscriber. Filtering comes from `RUST_LOG`,
/// defaulting to info.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    registry()
        .with(filter)
        .with(HierarchicalLayer::new(2).with_targets(true))
        .init();
}
