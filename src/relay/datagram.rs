//! Datagram relay connection.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::BytesMut;

use super::ClientCore;
use crate::config::RelayConfig;
use crate::conn::Conn;
use crate::error::Result;
use crate::protocol::read_frame;
use crate::transport::Transport;

/// Message-oriented connection through a relay (UDP over a stream).
///
/// Every write becomes one `[len: u16 BE][payload]` frame and every read
/// returns one frame. Payloads above 65535 bytes are rejected before anything
/// is written. A frame larger than the read buffer is truncated; the excess
/// is discarded.
///
/// # Cancel safety
///
/// A read dropped before any byte of the next frame has arrived loses
/// nothing. Once part of a frame has been consumed, dropping the read leaves
/// the stream mid-frame; close the connection instead of reading again.
pub struct RelayDatagram<T> {
    core: ClientCore<T>,
}

impl<T: Transport> RelayDatagram<T> {
    /// Wrap `transport` with the default configuration. `pending` may be empty.
    pub fn new(transport: T, pending: BytesMut) -> Self {
        Self::with_config(transport, pending, RelayConfig::default())
    }

    pub fn with_config(transport: T, pending: BytesMut, config: RelayConfig) -> Self {
        Self {
            core: ClientCore::new(transport, pending, config),
        }
    }

    /// Whether the relay response has been consumed.
    pub fn is_handshake_done(&self) -> bool {
        self.core.handshake.is_done()
    }
}

#[async_trait]
impl<T: Transport> Conn for RelayDatagram<T> {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async {
                let mut reader = self.core.reader().await?;
                read_frame(&mut *reader, buf, &self.core.config.pool).await
            })
            .await
    }

    async fn write(&self, buf: &[u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async { self.core.halves.writer().await?.write_frame(buf).await })
            .await?;
        Ok(buf.len())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.core.local_addr
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.core.remote_addr
    }

    async fn close(&self) -> Result<()> {
        self.core.halves.close().await
    }

    async fn close_write(&self) -> Result<()> {
        self.core.halves.close_write().await
    }
}
