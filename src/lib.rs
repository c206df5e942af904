pub mod config;
pub mod env;
pub mod error;
pub mod formatter;
pub mod record;
pub mod sender;
pub mod sink;
pub mod transport;

pub mod layer;
pub mod init;

pub use config::{TransportConfig, TransportOptions};
pub use error::TransportError;
pub use record::{LogEvent, Meta};
pub use sink::Transport;
pub use transport::UdpTransport;

/// Target of the crate's own diagnostics. [`layer::LogstashLayer`] never
/// forwards events with this target.
pub const INTERNAL_TARGET: &str = "tracing_logstash_udp::internal";
