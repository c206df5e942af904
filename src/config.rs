use serde::Deserialize;

use crate::error::TransportError;

/// Collector address used when no host is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Line terminator of the platform the crate was compiled for.
pub const PLATFORM_EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Immutable configuration of a [`UdpTransport`](crate::transport::UdpTransport).
///
/// Built through [`TransportConfig::builder`] or from
/// [`TransportOptions`]. The trailing terminator is resolved once at
/// build time, so formatting never consults the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    host: String,
    port: u16,
    app_name: String,
    server_name: String,
    pid: u32,
    trailing_line_feed: bool,
    trailing_line_feed_char: Option<String>,
    silent: bool,
    line_ending: Option<String>,
}

impl TransportConfig {
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Parse JSON options using the collector option names
    /// (`host`, `port`, `appName`, `serverName`, ...).
    pub fn from_json(json: &str) -> Result<Self, TransportError> {
        let options: TransportOptions = serde_json::from_str(json)
            .map_err(|e| TransportError::invalid(format!("malformed options: {e}")))?;
        TransportConfig::try_from(options)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn trailing_line_feed(&self) -> bool {
        self.trailing_line_feed
    }

    /// Explicit terminator override, if one was configured.
    pub fn trailing_line_feed_char(&self) -> Option<&str> {
        self.trailing_line_feed_char.as_deref()
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    /// Terminator appended after every payload, or `None` when
    /// `trailing_line_feed` is off.
    pub fn line_ending(&self) -> Option<&str> {
        self.line_ending.as_deref()
    }
}

/// Builder for [`TransportConfig`].
///
/// Only `port` is mandatory. `pid`, `app_name` and `server_name` fall
/// back to values taken from the running process when left unset.
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    app_name: Option<String>,
    server_name: Option<String>,
    pid: Option<u32>,
    trailing_line_feed: bool,
    trailing_line_feed_char: Option<String>,
    silent: bool,
}

impl TransportConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn trailing_line_feed(mut self, enabled: bool) -> Self {
        self.trailing_line_feed = enabled;
        self
    }

    pub fn trailing_line_feed_char(mut self, terminator: impl Into<String>) -> Self {
        self.trailing_line_feed_char = Some(terminator.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// Fails with [`TransportError::InvalidConfiguration`] when the port
    /// is missing or zero, or when the host or application name is empty.
    pub fn build(self) -> Result<TransportConfig, TransportError> {
        let port = match self.port {
            Some(0) => return Err(TransportError::invalid("port must be non-zero")),
            Some(port) => port,
            None => return Err(TransportError::invalid("port is required")),
        };

        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.trim().is_empty() {
            return Err(TransportError::invalid("host must not be empty"));
        }

        let app_name = self.app_name.unwrap_or_else(default_app_name);
        if app_name.is_empty() {
            return Err(TransportError::invalid("appName must not be empty"));
        }

        let server_name = self.server_name.unwrap_or_else(default_server_name);
        let pid = self.pid.unwrap_or_else(std::process::id);

        // An empty override behaves like no override at all.
        let trailing_line_feed_char = self.trailing_line_feed_char.filter(|c| !c.is_empty());
        let line_ending = self.trailing_line_feed.then(|| {
            trailing_line_feed_char
                .clone()
                .unwrap_or_else(|| PLATFORM_EOL.to_string())
        });

        Ok(TransportConfig {
            host,
            port,
            app_name,
            server_name,
            pid,
            trailing_line_feed: self.trailing_line_feed,
            trailing_line_feed_char,
            silent: self.silent,
            line_ending,
        })
    }
}

/// Deserializable option bag using the collector's camelCase names.
///
/// `localhost` is accepted as an alias of `serverName`. Unknown keys are
/// ignored so the same document can carry options for other sinks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub app_name: Option<String>,
    #[serde(alias = "localhost")]
    pub server_name: Option<String>,
    pub pid: Option<u32>,
    #[serde(default)]
    pub trailing_line_feed: bool,
    pub trailing_line_feed_char: Option<String>,
    #[serde(default)]
    pub silent: bool,
}

impl TryFrom<TransportOptions> for TransportConfig {
    type Error = TransportError;

    fn try_from(options: TransportOptions) -> Result<Self, Self::Error> {
        let mut builder = TransportConfig::builder()
            .trailing_line_feed(options.trailing_line_feed)
            .silent(options.silent);

        if let Some(host) = options.host {
            builder = builder.host(host);
        }
        if let Some(port) = options.port {
            builder = builder.port(port);
        }
        if let Some(app_name) = options.app_name {
            builder = builder.app_name(app_name);
        }
        if let Some(server_name) = options.server_name {
            builder = builder.server_name(server_name);
        }
        if let Some(pid) = options.pid {
            builder = builder.pid(pid);
        }
        if let Some(terminator) = options.trailing_line_feed_char {
            builder = builder.trailing_line_feed_char(terminator);
        }

        builder.build()
    }
}

fn default_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "rust".to_string())
}

fn default_server_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
