use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::formatter::{format, to_meta};
use crate::record::{LogEvent, Meta};
use crate::sender::UdpSender;
use crate::sink::Transport;

/// Capacity of the error channel. Slow subscribers observe `Lagged`.
pub const ERROR_CHANNEL_CAPACITY: usize = 64;

/// Counters maintained by [`UdpTransport`].
#[derive(Debug, Default)]
pub struct TransportStats {
    /// Log calls received, including silent and failed ones.
    pub total: AtomicU64,
    /// Datagrams handed to the OS.
    pub sent: AtomicU64,
    /// Calls that ended on the error channel.
    pub failed: AtomicU64,
}

/// Ships every log call to a UDP collector as one JSON datagram.
///
/// The transport is Open after [`UdpTransport::open`] and becomes Closed
/// only through [`Transport::close`] (or drop). Nothing on the logging
/// path returns an error or panics: failures are published on the error
/// channel and counted in [`TransportStats`].
pub struct UdpTransport {
    config: TransportConfig,
    sender: UdpSender,
    errors: broadcast::Sender<TransportError>,
    pub stats: Arc<TransportStats>,
}

impl UdpTransport {
    /// Bind the socket for `config`.
    ///
    /// **Returns**
    /// - `Ok(transport)` in the Open state.
    /// - `Err(TransportError::Socket)` if the host cannot be resolved or no
    ///   local socket can be bound.
    pub fn open(config: TransportConfig) -> Result<Self, TransportError> {
        let sender = UdpSender::open(&config)?;
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Ok(UdpTransport {
            config,
            sender,
            errors,
            stats: Arc::new(TransportStats::default()),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn sender(&self) -> &UdpSender {
        &self.sender
    }

    /// Log with meta taken from any serializable value.
    ///
    /// When `meta` cannot be represented as a JSON object a serialization
    /// error is published and nothing is sent.
    pub fn log_with<M>(&self, level: &str, message: &str, meta: &M)
    where
        M: Serialize + ?Sized,
    {
        if self.config.silent() {
            self.stats.total.fetch_add(1, Ordering::Relaxed);
            return;
        }
        match to_meta(meta) {
            Ok(meta) => self.log(level, message, meta),
            Err(err) => {
                self.stats.total.fetch_add(1, Ordering::Relaxed);
                self.report(err);
            }
        }
    }

    /// Format and send an already built event.
    pub fn log_event(&self, event: &LogEvent) {
        self.stats.total.fetch_add(1, Ordering::Relaxed);
        if self.config.silent() {
            return;
        }

        let result = format(&self.config, event).and_then(|payload| self.sender.send(&payload));
        match result {
            Ok(_) => {
                self.stats.sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => self.report(err),
        }
    }

    fn report(&self, err: TransportError) {
        self.stats.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: crate::INTERNAL_TARGET,
            transport = self.name(),
            error = %err,
            "log datagram dropped"
        );
        // No subscribers is fine; the error is only counted then.
        let _ = self.errors.send(err);
    }
}

impl Transport for UdpTransport {
    fn name(&self) -> &str {
        "logstash-udp"
    }

    fn log(&self, level: &str, message: &str, meta: Meta) {
        let event = LogEvent::new(level, message).with_meta(meta);
        self.log_event(&event);
    }

    fn close(&self) {
        self.sender.close();
    }

    fn is_open(&self) -> bool {
        self.sender.is_open()
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportError> {
        self.errors.subscribe()
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.sender.close();
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("config", &self.config)
            .field("sender", &self.sender)
            .finish()
    }
}
