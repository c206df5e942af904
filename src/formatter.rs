//! Turns a [`LogEvent`] into the bytes of one datagram.

use serde::Serialize;
use serde_json::Value;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::record::{LogEvent, Meta};

/// Build the payload for `event`.
///
/// The JSON object holds the event's meta in insertion order followed by
/// `application`, `serverName`, `pid`, `level` and `message`. Those five
/// always carry the current config and call values; a meta key with the
/// same name is overwritten. The configured line ending, if any, is
/// appended after the compact JSON.
pub fn format(config: &TransportConfig, event: &LogEvent) -> Result<Vec<u8>, TransportError> {
    let mut payload = event.meta.clone();
    payload.insert("application".into(), Value::from(config.app_name()));
    payload.insert("serverName".into(), Value::from(config.server_name()));
    payload.insert("pid".into(), Value::from(config.pid()));
    payload.insert("level".into(), Value::from(event.level.as_str()));
    payload.insert("message".into(), Value::from(event.message.as_str()));

    let mut bytes = serde_json::to_vec(&payload)?;
    if let Some(eol) = config.line_ending() {
        bytes.extend_from_slice(eol.as_bytes());
    }
    Ok(bytes)
}

/// Convert caller-supplied structured data into [`Meta`].
///
/// `()` and `None` give empty meta. Anything that does not serialize to a
/// JSON object (a bare number, a list, a map with non-string keys, a
/// failing `Serialize` impl) is a serialization error.
pub fn to_meta<T>(value: &T) -> Result<Meta, TransportError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Meta::new()),
        Value::Bool(_) => Err(TransportError::MetaNotObject("a boolean")),
        Value::Number(_) => Err(TransportError::MetaNotObject("a number")),
        Value::String(_) => Err(TransportError::MetaNotObject("a string")),
        Value::Array(_) => Err(TransportError::MetaNotObject("an array")),
    }
}
