use std::net::UdpSocket;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::info;

use tracing_logstash_udp::init::init_tracing;
use tracing_logstash_udp::{TransportConfig, UdpTransport};

#[tokio::main]
async fn main() {
    // Local sink socket that nobody reads; datagrams pile up or get dropped
    // by the kernel, which is what a slow collector looks like.
    let sink = UdpSocket::bind("127.0.0.1:0").expect("bind sink socket");
    let port = sink.local_addr().expect("sink address").port();

    let config = TransportConfig::builder()
        .port(port)
        .app_name("default_load")
        .build()
        .expect("valid config");
    let transport = Arc::new(UdpTransport::open(config).expect("open transport"));
    let stats = Arc::clone(&transport.stats);
    init_tracing(transport).expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        info!(iteration = i, "default load test event");
    }

    let elapsed = start.elapsed();
    println!("default config: logged {} events in {:?} (~{:.0} ev/s), sent={} failed={}",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        stats.sent.load(Ordering::Relaxed),
        stats.failed.load(Ordering::Relaxed),
    );

    sleep(Duration::from_millis(100)).await;
}
