use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};
use tracing_logstash_udp::config::PLATFORM_EOL;
use tracing_logstash_udp::error::SocketOp;
use tracing_logstash_udp::init::{subscriber, LayerConfig};
use tracing_logstash_udp::{Meta, Transport, TransportConfig, TransportError, UdpTransport};

async fn collector() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("unable to bind collector socket");
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

async fn recv(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = vec![0u8; 64 * 1024];
    let (n, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    buf.truncate(n);
    buf
}

async fn nothing_arrives(socket: &UdpSocket) -> bool {
    let mut buf = [0u8; 1024];
    timeout(Duration::from_millis(200), socket.recv_from(&mut buf))
        .await
        .is_err()
}

fn config(port: u16) -> tracing_logstash_udp::config::TransportConfigBuilder {
    TransportConfig::builder()
        .port(port)
        .app_name("test")
        .server_name("localhost")
        .pid(12345)
}

fn sample_meta() -> Meta {
    let mut meta = Meta::new();
    meta.insert("stream".into(), json!("sample"));
    meta
}

#[tokio::test]
async fn sends_logs_over_udp_as_valid_json() {
    let (server, port) = collector().await;
    let transport = UdpTransport::open(config(port).build().unwrap()).unwrap();

    transport.log("info", "hello world", sample_meta());

    let data = recv(&server).await;
    let response: Value = serde_json::from_slice(&data).unwrap();
    assert_eq!(
        response,
        json!({"stream": "sample", "application": "test", "serverName": "localhost",
               "pid": 12345, "level": "info", "message": "hello world"})
    );
    assert_eq!(
        std::str::from_utf8(&data).unwrap(),
        r#"{"stream":"sample","application":"test","serverName":"localhost","pid":12345,"level":"info","message":"hello world"}"#
    );
}

#[tokio::test]
async fn no_trailing_bytes_by_default() {
    let (server, port) = collector().await;
    let transport = UdpTransport::open(config(port).build().unwrap()).unwrap();

    transport.log("info", "hello world", sample_meta());

    let data = recv(&server).await;
    assert_eq!(data.last(), Some(&b'}'));
}

#[tokio::test]
async fn trailing_line_feed_uses_platform_eol_by_default() {
    let (server, port) = collector().await;
    let cfg = config(port).trailing_line_feed(true).build().unwrap();
    let transport = UdpTransport::open(cfg).unwrap();

    transport.log("info", "hello world", sample_meta());

    let data = String::from_utf8(recv(&server).await).unwrap();
    assert!(data.ends_with(PLATFORM_EOL));
    serde_json::from_str::<Value>(data.trim_end()).unwrap();
}

#[tokio::test]
async fn trailing_line_feed_uses_configured_terminator() {
    let (server, port) = collector().await;
    let cfg = config(port)
        .trailing_line_feed(true)
        .trailing_line_feed_char("\r\n")
        .build()
        .unwrap();
    let transport = UdpTransport::open(cfg).unwrap();

    transport.log("info", "hello world", sample_meta());

    let data = recv(&server).await;
    assert_eq!(&data[data.len() - 2..], b"\r\n");
}

#[tokio::test]
async fn options_document_configures_transport() {
    let (server, port) = collector().await;
    let cfg = TransportConfig::from_json(&format!(
        r#"{{"port": {port}, "appName": "test", "localhost": "localhost", "pid": 12345}}"#
    ))
    .unwrap();
    let transport = UdpTransport::open(cfg).unwrap();

    transport.log_with("info", "hello world", &json!({"stream": "sample"}));

    let response: Value = serde_json::from_slice(&recv(&server).await).unwrap();
    assert_eq!(response["serverName"], "localhost");
    assert_eq!(response["stream"], "sample");
}

#[tokio::test]
async fn log_after_close_does_not_panic() {
    let (server, port) = collector().await;
    let transport = UdpTransport::open(config(port).build().unwrap()).unwrap();
    let mut errors = transport.subscribe();

    transport.close();
    transport.log("info", "after close", sample_meta());

    let err = timeout(Duration::from_secs(1), errors.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(err, TransportError::Closed));
    assert!(nothing_arrives(&server).await);
}

#[tokio::test]
async fn oversized_datagram_is_reported_as_send_error() {
    let (server, port) = collector().await;
    let transport = UdpTransport::open(config(port).build().unwrap()).unwrap();
    let mut errors = transport.subscribe();
    assert_eq!(transport.name(), "logstash-udp");

    // Larger than the 65,507-byte UDP payload limit over IPv4.
    let mut meta = Meta::new();
    meta.insert("big".into(), json!("x".repeat(70_000)));
    transport.log("info", "huge", meta);

    let err = errors.try_recv().unwrap();
    assert!(matches!(
        err,
        TransportError::Socket {
            op: SocketOp::Send,
            ..
        }
    ));
    assert_eq!(transport.stats.failed.load(Ordering::Relaxed), 1);
    assert_eq!(transport.stats.sent.load(Ordering::Relaxed), 0);
    assert!(transport.is_open());
    assert!(nothing_arrives(&server).await);

    // The socket stays usable after a failed send.
    transport.log("info", "hello world", sample_meta());
    let response: Value = serde_json::from_slice(&recv(&server).await).unwrap();
    assert_eq!(response["message"], "hello world");
    assert_eq!(transport.stats.sent.load(Ordering::Relaxed), 1);
}

struct Failing;

impl Serialize for Failing {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cannot serialize"))
    }
}

#[derive(Serialize)]
struct WithFailingField {
    stream: &'static str,
    broken: Failing,
}

#[tokio::test]
async fn unserializable_meta_is_reported_and_not_sent() {
    let (server, port) = collector().await;
    let transport = UdpTransport::open(config(port).build().unwrap()).unwrap();
    let mut errors = transport.subscribe();

    transport.log_with(
        "info",
        "hello world",
        &WithFailingField { stream: "sample", broken: Failing },
    );

    let err = errors.recv().await.unwrap();
    assert!(matches!(err, TransportError::Serialization(_)));
    assert!(nothing_arrives(&server).await);
}

#[tokio::test]
async fn concurrent_callers_share_the_socket() {
    let (server, port) = collector().await;
    let transport = Arc::new(UdpTransport::open(config(port).build().unwrap()).unwrap());

    let mut handles = Vec::new();
    for worker in 0..4 {
        let transport = Arc::clone(&transport);
        handles.push(std::thread::spawn(move || {
            for i in 0..5 {
                let mut meta = Meta::new();
                meta.insert("worker".into(), json!(worker));
                meta.insert("i".into(), json!(i));
                transport.log("info", "parallel", meta);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Loopback delivery of 20 small datagrams is reliable enough here.
    for _ in 0..20 {
        let response: Value = serde_json::from_slice(&recv(&server).await).unwrap();
        assert_eq!(response["message"], "parallel");
        assert_eq!(response["application"], "test");
    }
}

#[tokio::test]
async fn tracing_events_arrive_as_datagrams() {
    let (server, port) = collector().await;
    let transport: Arc<dyn Transport> =
        Arc::new(UdpTransport::open(config(port).build().unwrap()).unwrap());

    let subscriber = subscriber(Arc::clone(&transport), LayerConfig::default());
    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("filtered out");
        tracing::info!(stream = "sample", "hello world");
    });

    let response: Value = serde_json::from_slice(&recv(&server).await).unwrap();
    assert_eq!(
        response,
        json!({"stream": "sample", "application": "test", "serverName": "localhost",
               "pid": 12345, "level": "info", "message": "hello world"})
    );
    assert!(nothing_arrives(&server).await);
}

#[test]
fn missing_port_fails_construction() {
    let err = TransportConfig::builder().app_name("test").build().unwrap_err();
    assert!(matches!(err, TransportError::InvalidConfiguration(_)));
}
