use tokio::sync::broadcast;

use crate::error::TransportError;
use crate::record::Meta;

/// Output sink a logger front-end hands its events to.
///
/// Implementations deliver records to a concrete destination (a UDP
/// collector, a test buffer, etc). The front-end calls [`Transport::log`]
/// on the application thread, so implementations must return promptly and
/// must never panic or propagate delivery failures: those go to the
/// channel returned by [`Transport::subscribe`].
pub trait Transport: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Deliver a single record.
    ///
    /// **Parameters**
    /// - `level`: severity label, e.g. `"info"`.
    /// - `message`: free-text message.
    /// - `meta`: structured fields attached to this call.
    fn log(&self, level: &str, message: &str, meta: Meta);

    /// Release the underlying resources. Later `log` calls must not
    /// panic; they are either dropped or reported as errors.
    fn close(&self);

    /// Whether the transport still accepts records.
    fn is_open(&self) -> bool;

    /// Subscribe to runtime failures (serialization, socket, closed).
    ///
    /// Each receiver sees errors published after it subscribed.
    fn subscribe(&self) -> broadcast::Receiver<TransportError>;
}
