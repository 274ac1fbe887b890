//! Accept-side connections of a bound relay tunnel.
//!
//! The component that accepted the tunnel session has already completed the
//! relay handshake, so these wrappers do no response check and no header
//! coalescing. They report the tunnel-assigned addresses instead of the
//! transport's own, and carry the session [`Metadata`].

mod datagram;
mod stream;

pub use datagram::BoundDatagram;
pub use stream::BoundConn;

use std::net::SocketAddr;

use bytes::BytesMut;

use crate::config::RelayConfig;
use crate::metadata::Metadata;
use crate::transport::{Halves, Transport};

/// State shared by both bound wrappers. Fixed at wrap time.
struct BoundCore<T> {
    halves: Halves<T>,
    config: RelayConfig,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
    metadata: Metadata,
}

impl<T: Transport> BoundCore<T> {
    fn new(
        transport: T,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        metadata: Metadata,
        config: RelayConfig,
    ) -> Self {
        Self {
            halves: Halves::new(transport, BytesMut::new()),
            config,
            local_addr,
            remote_addr,
            metadata,
        }
    }
}
