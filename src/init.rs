use crate::layer::LogstashLayer;
use crate::sink::Transport;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the tracing integration.
///
/// **Fields**
/// - `max_level`: least severe level forwarded to the transport.
/// - `enable_stdout`: if `true` (and the `stdout` feature is enabled), a
///   `tracing_subscriber::fmt::Layer` is stacked on top so events are
///   also printed to the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub max_level: Level,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            max_level: Level::INFO,
            enable_stdout: false,
        }
    }
}

/// Build a subscriber that forwards events to `transport`.
///
/// The subscriber is returned rather than installed, so callers can
/// scope it with `tracing::subscriber::with_default` or install it
/// themselves.
pub fn subscriber(
    transport: Arc<dyn Transport>,
    config: LayerConfig,
) -> Box<dyn Subscriber + Send + Sync> {
    let layer = LogstashLayer::new(transport).with_max_level(config.max_level);

    // Two variants because the stacked types differ.
    #[cfg(feature = "stdout")]
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        return Box::new(Registry::default().with(layer).with(fmt_layer));
    }

    Box::new(Registry::default().with(layer))
}

/// Install the subscriber from [`subscriber`] as the process-wide default.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    transport: Arc<dyn Transport>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(transport, config))
}

/// Install the transport with [`LayerConfig::default`].
pub fn init_tracing(transport: Arc<dyn Transport>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(transport, LayerConfig::default())
}
