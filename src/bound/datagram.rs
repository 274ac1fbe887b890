//! Bound datagram connection.

use std::net::SocketAddr;

use async_trait::async_trait;

use super::BoundCore;
use crate::config::RelayConfig;
use crate::conn::{Conn, Metadatable, PacketConn};
use crate::error::Result;
use crate::metadata::Metadata;
use crate::protocol::read_frame;
use crate::transport::Transport;

/// Datagram side of an accepted tunnel.
///
/// Uses the same `[len: u16 BE][payload]` framing as
/// [`RelayDatagram`](crate::RelayDatagram). As a [`PacketConn`], every message
/// comes from the tunnel peer and every message goes to it: `recv_from`
/// reports the tunnel-assigned remote address, `send_to` ignores its address
/// argument.
///
/// Reads have the same cancel safety as
/// [`RelayDatagram`](crate::RelayDatagram#cancel-safety).
pub struct BoundDatagram<T> {
    core: BoundCore<T>,
}

impl<T: Transport> BoundDatagram<T> {
    pub fn new(
        transport: T,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        metadata: Metadata,
    ) -> Self {
        Self::with_config(
            transport,
            local_addr,
            remote_addr,
            metadata,
            RelayConfig::default(),
        )
    }

    /// Wrap with a specific configuration (buffer pool).
    pub fn with_config(
        transport: T,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        metadata: Metadata,
        config: RelayConfig,
    ) -> Self {
        Self {
            core: BoundCore::new(transport, local_addr, remote_addr, metadata, config),
        }
    }
}

#[async_trait]
impl<T: Transport> Conn for BoundDatagram<T> {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async {
                let mut reader = self.core.halves.reader().await?;
                read_frame(&mut *reader, buf, &self.core.config.pool).await
            })
            .await
    }

    /// Prefix and payload go out as one transport write.
    async fn write(&self, buf: &[u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async {
                self.core
                    .halves
                    .writer()
                    .await?
                    .write_frame_pooled(buf, &self.core.config.pool)
                    .await
            })
            .await?;
        Ok(buf.len())
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        Some(self.core.local_addr)
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        Some(self.core.remote_addr)
    }

    async fn close(&self) -> Result<()> {
        self.core.halves.close().await
    }

    async fn close_write(&self) -> Result<()> {
        self.core.halves.close_write().await
    }
}

#[async_trait]
impl<T: Transport> PacketConn for BoundDatagram<T> {
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let n = Conn::read(self, buf).await?;
        Ok((n, self.core.remote_addr))
    }

    async fn send_to(&self, buf: &[u8], _addr: SocketAddr) -> Result<usize> {
        Conn::write(self, buf).await
    }
}

impl<T> Metadatable for BoundDatagram<T> {
    fn metadata(&self) -> &Metadata {
        &self.core.metadata
    }
}
