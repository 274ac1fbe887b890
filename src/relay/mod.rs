//! Client-side relay connections.
//!
//! Both wrappers are built right after the relay request has been queued but
//! before the relay has answered:
//! - the request bytes are passed in as a pending header and go out together
//!   with the first write
//! - the relay response is read lazily, by the first read
//!
//! [`RelayStream`] passes bytes through unchanged; [`RelayDatagram`] carries
//! length-prefixed messages.

mod datagram;
mod stream;

pub use datagram::RelayDatagram;
pub use stream::RelayStream;

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::ReadHalf;
use tokio::sync::MappedMutexGuard;

use crate::config::RelayConfig;
use crate::error::Result;
use crate::protocol::DeferredHandshake;
use crate::transport::{Halves, Transport};

/// State shared by both client wrappers.
struct ClientCore<T> {
    halves: Halves<T>,
    handshake: DeferredHandshake,
    config: RelayConfig,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
}

impl<T: Transport> ClientCore<T> {
    fn new(transport: T, pending: BytesMut, config: RelayConfig) -> Self {
        let handshake = if config.response_check {
            DeferredHandshake::new()
        } else {
            DeferredHandshake::completed()
        };

        Self {
            local_addr: transport.local_addr(),
            remote_addr: transport.peer_addr(),
            halves: Halves::new(transport, pending),
            handshake,
            config,
        }
    }

    /// Lock the read half, consuming the relay response on first use.
    async fn reader(&self) -> Result<MappedMutexGuard<'_, ReadHalf<T>>> {
        let mut reader = self.halves.reader().await?;
        self.handshake
            .check(&mut *reader, &*self.config.status_text)
            .await?;
        Ok(reader)
    }
}
