//! Bound stream connection.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::BoundCore;
use crate::config::RelayConfig;
use crate::conn::{Conn, Metadatable};
use crate::error::Result;
use crate::metadata::Metadata;
use crate::transport::Transport;

/// Stream side of an accepted tunnel.
///
/// Reads and writes pass straight through. `local_addr` / `remote_addr`
/// report the tunnel-assigned endpoints.
pub struct BoundConn<T> {
    core: BoundCore<T>,
}

impl<T: Transport> BoundConn<T> {
    pub fn new(
        transport: T,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        metadata: Metadata,
    ) -> Self {
        Self {
            core: BoundCore::new(
                transport,
                local_addr,
                remote_addr,
                metadata,
                RelayConfig::default(),
            ),
        }
    }
}

#[async_trait]
impl<T: Transport> Conn for BoundConn<T> {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async { Ok(self.core.halves.reader().await?.read(buf).await?) })
            .await
    }

    async fn write(&self, buf: &[u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async { self.core.halves.writer().await?.write_coalesced(buf).await })
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

impl<T> Metadatable for BoundConn<T> {
    fn metadata(&self) -> &Metadata {
        &self.core.metadata
    }
}
