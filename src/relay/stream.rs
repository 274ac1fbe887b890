//! Stream relay connection.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::AsyncReadExt;

use super::ClientCore;
use crate::config::RelayConfig;
use crate::conn::Conn;
use crate::error::Result;
use crate::transport::Transport;

/// Byte stream through a relay.
///
/// The first read consumes the relay response; the first write carries the
/// pending header. After that, reads and writes go straight to the transport.
///
/// # Example
///
/// ```ignore
/// use bytes::BytesMut;
/// use relay_conn::{Conn, RelayStream};
///
/// let request = BytesMut::from(&encoded_connect_request[..]);
/// let conn = RelayStream::new(tcp, request);
/// conn.write(b"GET / HTTP/1.1\r\n\r\n").await?; // request + data, one write
/// let n = conn.read(&mut buf).await?;         // checks the relay response first
/// ```
pub struct RelayStream<T> {
    core: ClientCore<T>,
}

impl<T: Transport> RelayStream<T> {
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
impl<T: Transport> Conn for RelayStream<T> {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async {
                let mut reader = self.core.reader().await?;
                Ok(reader.read(buf).await?)
            })
            .await
    }

    /// Reports the full input length on success.
    async fn write(&self, buf: &[u8]) -> Result<usize> {
        self.core
            .halves
            .guarded(async { self.core.halves.writer().await?.write_coalesced(buf).await })
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
