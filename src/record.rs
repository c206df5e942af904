use serde_json::{Map, Value};

/// Caller-supplied structured data attached to one log call.
///
/// Backed by `serde_json::Map` with `preserve_order`, so keys are
/// serialized in the order they were inserted.
pub type Meta = Map<String, Value>;

/// One logging call as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: String,
    pub message: String,
    pub meta: Meta,
}

impl LogEvent {
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            level: level.into(),
            message: message.into(),
            meta: Meta::new(),
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Insert one meta field, replacing any previous value under `key`.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
