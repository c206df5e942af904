use crate::record::Meta;
use crate::sink::Transport;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that observes events and forwards each one
/// to a [`Transport`].
///
/// By default this layer captures events with level `INFO` and above.
/// Event fields become the record's meta, the `message` field becomes the
/// message and the level is rendered lowercase (`"info"`). The transport
/// is injected by the caller; the layer holds no global state.
pub struct LogstashLayer {
    transport: Arc<dyn Transport>,
    max_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to the transport.
    pub forwarded_events: Arc<AtomicU64>,
}

impl LogstashLayer {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_level: Level::INFO,
            total_events: Arc::new(AtomicU64::new(0)),
            forwarded_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Forward only events at `level` or more severe.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl<S> Layer<S> for LogstashLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        // Our own diagnostics would otherwise loop back into the socket.
        if meta.target() == crate::INTERNAL_TARGET {
            return;
        }

        let mut fields = Meta::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let level = meta.level().to_string().to_ascii_lowercase();
        self.transport
            .log(&level, message.as_deref().unwrap_or_default(), fields);
        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Meta,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `info!("...")` records its message through here as fmt::Arguments.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
