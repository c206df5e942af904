use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_logstash_udp::env::config_from_env;
use tracing_logstash_udp::init::{init_tracing_with_config, LayerConfig};
use tracing_logstash_udp::{Transport, UdpTransport};

/// Ships events to the collector described by `LOGSTASH_UDP_*`, e.g.
///
/// ```text
/// LOGSTASH_UDP_PORT=5000 LOGSTASH_UDP_APP_NAME=checkout \
///     cargo run --example collector
/// ```
#[tokio::main]
async fn main() {
    let config = match config_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let transport = Arc::new(UdpTransport::open(config).expect("open transport"));

    let mut errors = transport.subscribe();
    tokio::spawn(async move {
        while let Ok(err) = errors.recv().await {
            eprintln!("log datagram dropped: {err}");
        }
    });

    let config = LayerConfig {
        enable_stdout: true,
        ..LayerConfig::default()
    };
    init_tracing_with_config(transport.clone(), config).expect("install subscriber");

    info!("starting service");
    warn!(queue = "payments", depth = 512, "queue is backing up");
    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    sleep(Duration::from_millis(100)).await;
    transport.close();
}
