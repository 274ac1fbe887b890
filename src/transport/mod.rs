//! Transport module - the byte stream a relay connection runs over.
//!
//! Any tokio stream can carry a relay connection as long as it can report its
//! native addresses. Implementations are provided for:
//! - TCP streams
//! - Unix Domain Sockets (no socket addresses)
//! - In-memory duplex pipes (no socket addresses)

mod halves;

pub(crate) use halves::Halves;

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio::net::TcpStream;

/// A duplex byte stream that relay connections wrap.
///
/// Address accessors return `None` when the stream has no socket address
/// (in-memory pipes, Unix sockets).
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + 'static {
    /// Local address of the stream.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// Address of the remote peer.
    fn peer_addr(&self) -> Option<SocketAddr>;
}

impl Transport for TcpStream {
    fn local_addr(&self) -> Option<SocketAddr> {
        TcpStream::local_addr(self).ok()
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        TcpStream::peer_addr(self).ok()
    }
}

#[cfg(unix)]
impl Transport for tokio::net::UnixStream {
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

impl Transport for DuplexStream {
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
