//! Lock-guarded read and write halves of a transport.
//!
//! A wrapper is used by one reader and any number of writers at once, so the
//! transport is split with [`tokio::io::split`] and each half sits behind its
//! own async mutex. The write lock also guards the pending header and is held
//! across the transport write, so concurrent writes never interleave.
//!
//! Closing takes both halves out of their locks and drops them, which
//! releases the transport. Operations run through [`Halves::guarded`] are
//! aborted by a concurrent close.

use std::future::Future;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{watch, MappedMutexGuard, Mutex, MutexGuard};

use super::Transport;
use crate::error::{RelayError, Result};
use crate::pool::BufferPool;
use crate::protocol::{encode_frame_header, FRAME_HEADER_SIZE};

/// Both halves of a wrapped transport.
pub(crate) struct Halves<T> {
    reader: Mutex<Option<ReadHalf<T>>>,
    writer: Mutex<Option<FrameWriter<T>>>,
    closed: watch::Sender<bool>,
}

impl<T: Transport> Halves<T> {
    /// Split `transport`, queueing `pending` to go out with the first write.
    pub(crate) fn new(transport: T, pending: BytesMut) -> Self {
        let (read_half, write_half) = tokio::io::split(transport);
        let (closed, _) = watch::channel(false);
        Self {
            reader: Mutex::new(Some(read_half)),
            writer: Mutex::new(Some(FrameWriter {
                half: write_half,
                pending,
            })),
            closed,
        }
    }

    /// Lock the read half. Fails once the connection is closed.
    pub(crate) async fn reader(&self) -> Result<MappedMutexGuard<'_, ReadHalf<T>>> {
        MutexGuard::try_map(self.reader.lock().await, Option::as_mut)
            .map_err(|_| RelayError::Closed)
    }

    /// Lock the writer. Fails once the connection is closed.
    pub(crate) async fn writer(&self) -> Result<MappedMutexGuard<'_, FrameWriter<T>>> {
        MutexGuard::try_map(self.writer.lock().await, Option::as_mut)
            .map_err(|_| RelayError::Closed)
    }

    /// Run `op` unless the connection gets closed first.
    pub(crate) async fn guarded<F, O>(&self, op: F) -> Result<O>
    where
        F: Future<Output = Result<O>>,
    {
        let mut closed = self.closed.subscribe();
        tokio::select! {
            biased;
            _ = wait_closed(&mut closed) => Err(RelayError::Closed),
            res = op => res,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Shut down the write direction only.
    pub(crate) async fn close_write(&self) -> Result<()> {
        self.guarded(async { self.writer().await?.shutdown().await })
            .await
    }

    /// Close both directions and release the transport.
    ///
    /// Pending reads and writes fail with [`RelayError::Closed`]. A second
    /// close is a no-op.
    pub(crate) async fn close(&self) -> Result<()> {
        if self.closed.send_replace(true) {
            return Ok(());
        }

        let writer = self.writer.lock().await.take();
        let res = match writer {
            Some(mut writer) => writer.shutdown().await,
            None => Ok(()),
        };
        let reader = self.reader.lock().await.take();
        drop(reader);

        tracing::debug!("relay connection closed");
        res
    }
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

/// Write half plus the header bytes still waiting to reach the wire.
///
/// The pending header is merged into exactly one write and is empty forever
/// after, whether that write succeeded or not.
pub(crate) struct FrameWriter<T> {
    half: WriteHalf<T>,
    pending: BytesMut,
}

impl<T: Transport> FrameWriter<T> {
    /// Write `buf` as-is, prefixed by the pending header if one is queued.
    pub(crate) async fn write_coalesced(&mut self, buf: &[u8]) -> Result<()> {
        if !self.pending.is_empty() {
            self.pending.extend_from_slice(buf);
            return self.flush_pending().await;
        }

        self.half.write_all(buf).await?;
        self.half.flush().await?;
        Ok(())
    }

    /// Write one length-prefixed frame carrying `payload`.
    ///
    /// With a pending header the header, prefix and payload go out in a single
    /// write; otherwise the prefix and payload are two writes, in that order.
    pub(crate) async fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let prefix = encode_frame_header(payload.len())?;

        if !self.pending.is_empty() {
            self.pending.reserve(FRAME_HEADER_SIZE + payload.len());
            self.pending.put_slice(&prefix);
            self.pending.put_slice(payload);
            return self.flush_pending().await;
        }

        self.half.write_all(&prefix).await?;
        self.half.write_all(payload).await?;
        self.half.flush().await?;
        Ok(())
    }

    /// Write one length-prefixed frame as a single transport write, staging
    /// prefix and payload in a pooled buffer.
    pub(crate) async fn write_frame_pooled(
        &mut self,
        payload: &[u8],
        pool: &BufferPool,
    ) -> Result<()> {
        let prefix = encode_frame_header(payload.len())?;

        let mut buf = pool.acquire(FRAME_HEADER_SIZE + payload.len());
        buf[..FRAME_HEADER_SIZE].copy_from_slice(&prefix);
        buf[FRAME_HEADER_SIZE..].copy_from_slice(payload);

        self.half.write_all(&buf).await?;
        self.half.flush().await?;
        Ok(())
    }

    /// Shut down the write direction of the transport.
    pub(crate) async fn shutdown(&mut self) -> Result<()> {
        self.half.shutdown().await?;
        Ok(())
    }

    async fn flush_pending(&mut self) -> Result<()> {
        tracing::trace!("flushing {} bytes with pending header", self.pending.len());
        let res = self.half.write_all(&self.pending).await;
        self.pending.clear();
        res?;
        self.half.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
