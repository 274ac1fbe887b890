//! Connection contracts exposed by the wrappers.
//!
//! - [`Conn`]: generic duplex connection (read, write, addresses, close)
//! - [`PacketConn`]: connectionless send/receive on top of a framed stream
//! - [`Metadatable`]: access to metadata attached at wrap time
//!
//! Relay-unaware code takes `&dyn Conn` (or a generic `C: Conn`) and works the
//! same over a plain stream wrapper, a datagram wrapper or a bound session.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::error::Result;
use crate::metadata::Metadata;
use crate::pool::BufferPool;

/// Buffer size used by [`forward`] for each direction.
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Generic duplex connection.
///
/// Safe to use from one reader and any number of writers at the same time.
#[async_trait]
pub trait Conn: Send + Sync {
    /// Read into `buf`, returning the number of bytes stored.
    ///
    /// Stream connections are cancel safe. Datagram connections are cancel
    /// safe only while no byte of the next frame has arrived; dropping a read
    /// in the middle of a frame leaves the connection unusable.
    async fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Write `buf`, returning the number of bytes accepted.
    async fn write(&self, buf: &[u8]) -> Result<usize>;

    fn local_addr(&self) -> Option<SocketAddr>;

    fn remote_addr(&self) -> Option<SocketAddr>;

    /// Close the connection and release the underlying transport.
    ///
    /// Reads and writes pending at that moment, and every later one, fail
    /// with [`RelayError::Closed`](crate::RelayError::Closed).
    async fn close(&self) -> Result<()>;

    /// Shut down the write direction only. The peer sees end of stream and
    /// reading continues.
    async fn close_write(&self) -> Result<()>;
}

/// Connectionless send/receive, in the style of a UDP socket.
#[async_trait]
pub trait PacketConn: Send + Sync {
    /// Receive one message and the address it came from.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Send one message to `addr`.
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize>;
}

/// Connections carrying out-of-band metadata.
pub trait Metadatable {
    fn metadata(&self) -> &Metadata;
}

/// Copy bytes both ways between two stream connections.
///
/// Each direction runs until its source reports end of stream (`Ok(0)`),
/// then shuts down the write direction of the opposite side. Returns `(a_to_b, b_to_a)`.
/// The first error in either direction aborts both.
pub async fn forward<A, B>(a: &A, b: &B) -> Result<(u64, u64)>
where
    A: Conn + ?Sized,
    B: Conn + ?Sized,
{
    let (a_to_b, b_to_a) = tokio::try_join!(copy_one_way(a, b), copy_one_way(b, a))?;
    tracing::debug!(
        "forward finished: {} bytes a->b, {} bytes b->a",
        a_to_b,
        b_to_a
    );
    Ok((a_to_b, b_to_a))
}

async fn copy_one_way<R, W>(src: &R, dst: &W) -> Result<u64>
where
    R: Conn + ?Sized,
    W: Conn + ?Sized,
{
    let pool = BufferPool::global();
    let mut buf = pool.acquire(COPY_BUFFER_SIZE);
    let mut total = 0u64;

    loop {
        let n = src.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        dst.write(&buf[..n]).await?;
        total += n as u64;
    }

    dst.close_write().await?;
    Ok(total)
}
