//! Environment variable names used by this crate for convenient
//! configuration of the transport from services.
//!
//! These are purely helpers; `TransportConfig` itself never reads the
//! environment.

use crate::config::{TransportConfig, TransportConfigBuilder};
use crate::error::TransportError;

/// Collector host, e.g. `127.0.0.1` or `logstash.internal`.
pub const LOGSTASH_UDP_HOST_ENV: &str = "LOGSTASH_UDP_HOST";

/// Collector UDP port.
pub const LOGSTASH_UDP_PORT_ENV: &str = "LOGSTASH_UDP_PORT";

/// Value of the `application` field.
pub const LOGSTASH_UDP_APP_NAME_ENV: &str = "LOGSTASH_UDP_APP_NAME";

/// Value of the `serverName` field.
pub const LOGSTASH_UDP_SERVER_NAME_ENV: &str = "LOGSTASH_UDP_SERVER_NAME";

/// Value of the `pid` field.
pub const LOGSTASH_UDP_PID_ENV: &str = "LOGSTASH_UDP_PID";

/// `true` to terminate every datagram with a line feed.
pub const LOGSTASH_UDP_TRAILING_LINE_FEED_ENV: &str = "LOGSTASH_UDP_TRAILING_LINE_FEED";

/// Terminator override; escape sequences `\n` and `\r` are understood.
pub const LOGSTASH_UDP_TRAILING_LINE_FEED_CHAR_ENV: &str = "LOGSTASH_UDP_TRAILING_LINE_FEED_CHAR";

/// `true` to accept and discard every log call.
pub const LOGSTASH_UDP_SILENT_ENV: &str = "LOGSTASH_UDP_SILENT";

/// Build a [`TransportConfig`] from the `LOGSTASH_UDP_*` variables.
pub fn config_from_env() -> Result<TransportConfig, TransportError> {
    builder_from_lookup(|key| std::env::var(key).ok())?.build()
}

/// Populate a builder from an arbitrary key lookup.
///
/// Unset keys leave the builder defaults in place; values that fail to
/// parse are reported as [`TransportError::InvalidConfiguration`].
pub fn builder_from_lookup<F>(lookup: F) -> Result<TransportConfigBuilder, TransportError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = TransportConfig::builder();

    if let Some(host) = lookup(LOGSTASH_UDP_HOST_ENV) {
        builder = builder.host(host);
    }
    if let Some(port) = lookup(LOGSTASH_UDP_PORT_ENV) {
        let port = port.trim().parse::<u16>().map_err(|e| {
            TransportError::invalid(format!("{LOGSTASH_UDP_PORT_ENV}={port:?}: {e}"))
        })?;
        builder = builder.port(port);
    }
    if let Some(app_name) = lookup(LOGSTASH_UDP_APP_NAME_ENV) {
        builder = builder.app_name(app_name);
    }
    if let Some(server_name) = lookup(LOGSTASH_UDP_SERVER_NAME_ENV) {
        builder = builder.server_name(server_name);
    }
    if let Some(pid) = lookup(LOGSTASH_UDP_PID_ENV) {
        let pid = pid.trim().parse::<u32>().map_err(|e| {
            TransportError::invalid(format!("{LOGSTASH_UDP_PID_ENV}={pid:?}: {e}"))
        })?;
        builder = builder.pid(pid);
    }
    if let Some(flag) = lookup(LOGSTASH_UDP_TRAILING_LINE_FEED_ENV) {
        builder = builder.trailing_line_feed(parse_flag(LOGSTASH_UDP_TRAILING_LINE_FEED_ENV, &flag)?);
    }
    if let Some(terminator) = lookup(LOGSTASH_UDP_TRAILING_LINE_FEED_CHAR_ENV) {
        builder = builder.trailing_line_feed_char(unescape(&terminator));
    }
    if let Some(flag) = lookup(LOGSTASH_UDP_SILENT_ENV) {
        builder = builder.silent(parse_flag(LOGSTASH_UDP_SILENT_ENV, &flag)?);
    }

    Ok(builder)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, TransportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(TransportError::invalid(format!("{key}={other:?} is not a boolean"))),
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\r", "\r").replace("\\n", "\n")
}
