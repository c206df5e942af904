//! UDP socket ownership and datagram emission.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use parking_lot::RwLock;

use crate::config::TransportConfig;
use crate::error::{SocketOp, TransportError};

/// Owns the transport's UDP socket.
///
/// The remote endpoint is resolved once in [`UdpSender::open`]. Every
/// [`send`](UdpSender::send) is a single non-blocking `send_to`, so
/// concurrent callers only share a read guard; [`close`](UdpSender::close)
/// takes the write guard and drops the socket.
pub struct UdpSender {
    socket: RwLock<Option<UdpSocket>>,
    remote: SocketAddr,
}

impl UdpSender {
    /// Resolve `config.host:config.port` and bind an ephemeral local socket
    /// of the same address family.
    ///
    /// When the host resolves to both families the first IPv4 address is
    /// used, so `localhost` reaches collectors that only listen on IPv4.
    pub fn open(config: &TransportConfig) -> Result<Self, TransportError> {
        let remote = resolve(config.host(), config.port())?;
        let local: SocketAddr = match remote {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).map_err(|e| TransportError::socket(SocketOp::Bind, e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| TransportError::socket(SocketOp::Bind, e))?;

        tracing::debug!(
            target: crate::INTERNAL_TARGET,
            %remote,
            local = ?socket.local_addr().ok(),
            "udp sender opened"
        );

        Ok(UdpSender {
            socket: RwLock::new(Some(socket)),
            remote,
        })
    }

    /// Transmit `payload` as exactly one datagram.
    ///
    /// Returns the number of bytes handed to the OS. A full socket buffer
    /// surfaces as a `WouldBlock` socket error rather than a stall.
    pub fn send(&self, payload: &[u8]) -> Result<usize, TransportError> {
        let guard = self.socket.read();
        let socket = guard.as_ref().ok_or(TransportError::Closed)?;
        socket
            .send_to(payload, self.remote)
            .map_err(|e| TransportError::socket(SocketOp::Send, e))
    }

    /// Release the socket. Calling it again is a no-op.
    ///
    /// Returns `true` if this call closed the socket.
    pub fn close(&self) -> bool {
        let closed = self.socket.write().take().is_some();
        if closed {
            tracing::debug!(target: crate::INTERNAL_TARGET, remote = %self.remote, "udp sender closed");
        }
        closed
    }

    pub fn is_open(&self) -> bool {
        self.socket.read().is_some()
    }

    /// Resolved collector endpoint.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Local address of the socket, or `Closed` after [`close`](Self::close).
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        let guard = self.socket.read();
        let socket = guard.as_ref().ok_or(TransportError::Closed)?;
        socket
            .local_addr()
            .map_err(|e| TransportError::socket(SocketOp::Bind, e))
    }
}

impl std::fmt::Debug for UdpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSender")
            .field("remote", &self.remote)
            .field("open", &self.is_open())
            .finish()
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::socket(SocketOp::Resolve, e))?;
    pick_remote(addrs).ok_or_else(|| {
        TransportError::socket(
            SocketOp::Resolve,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address found for {host}:{port}"),
            ),
        )
    })
}

/// First IPv4 address, else the first address of any family.
fn pick_remote(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let addrs: Vec<SocketAddr> = addrs.into_iter().collect();
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
}
