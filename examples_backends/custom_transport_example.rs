use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_logstash_udp::{
    init::init_tracing,
    Meta,
    Transport,
    TransportError,
};

/// Example of plugging a completely custom destination into the layer by
/// implementing the `Transport` trait directly. This one prints every
/// record as a JSON line on stdout.
struct StdoutTransport {
    errors: broadcast::Sender<TransportError>,
}

impl Transport for StdoutTransport {
    fn name(&self) -> &str {
        "stdout"
    }

    fn log(&self, level: &str, message: &str, mut meta: Meta) {
        meta.insert("level".into(), level.into());
        meta.insert("message".into(), message.into());
        match serde_json::to_string(&meta) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                let _ = self.errors.send(e.into());
            }
        }
    }

    fn close(&self) {}

    fn is_open(&self) -> bool {
        true
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportError> {
        self.errors.subscribe()
    }
}

#[tokio::main]
async fn main() {
    let (errors, _) = broadcast::channel(16);
    let transport: Arc<dyn Transport> = Arc::new(StdoutTransport { errors });

    init_tracing(transport).expect("install subscriber");

    info!("custom transport example started");
    error!(db = "my-custom-db", "simulated error sent via custom transport");
}
