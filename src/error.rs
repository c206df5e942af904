use std::fmt;
use std::io;
use std::sync::Arc;

/// Socket operation that produced a [`TransportError::Socket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOp {
    Resolve,
    Bind,
    Send,
}

impl fmt::Display for SocketOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            SocketOp::Resolve => "resolve",
            SocketOp::Bind => "bind",
            SocketOp::Send => "send",
        };
        f.write_str(op)
    }
}

/// Errors produced by the transport.
///
/// Construction-time variants (`InvalidConfiguration`, `Socket` with
/// [`SocketOp::Resolve`] or [`SocketOp::Bind`]) are returned from
/// `open`/`build`. Everything that happens on the logging path is
/// published on the transport's error channel instead, which is why the
/// type is `Clone`.
#[derive(thiserror::Error, Debug, Clone)]
pub enum TransportError {
    #[error("failed to serialize log meta: {0}")]
    Serialization(Arc<serde_json::Error>),

    #[error("log meta must serialize to a JSON object, got {0}")]
    MetaNotObject(&'static str),

    #[error("socket {op} failed: {source}")]
    Socket {
        op: SocketOp,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("invalid transport configuration: {0}")]
    InvalidConfiguration(String),

    #[error("transport is closed")]
    Closed,
}

impl TransportError {
    pub(crate) fn socket(op: SocketOp, source: io::Error) -> Self {
        TransportError::Socket {
            op,
            source: Arc::new(source),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TransportError::InvalidConfiguration(msg.into())
    }

    /// True for the serialization family (`Serialization`, `MetaNotObject`).
    pub fn is_serialization(&self) -> bool {
        matches!(
            self,
            TransportError::Serialization(_) | TransportError::MetaNotObject(_)
        )
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(Arc::new(err))
    }
}
