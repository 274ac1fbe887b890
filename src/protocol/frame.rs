//! Datagram framing over a byte stream.
//!
//! Every message is sent as a 2-byte big-endian length followed by the
//! payload. A reader always consumes whole frames: when the destination is
//! smaller than the frame, the tail is dropped the way a datagram socket
//! drops the excess of a packet.
//!
//! # Example
//!
//! ```
//! use relay_conn::protocol::build_frame;
//!
//! let frame = build_frame(&[0x01, 0x02, 0x03]).unwrap();
//! assert_eq!(&frame[..], &[0x00, 0x03, 0x01, 0x02, 0x03]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::wire_format::{decode_frame_header, encode_frame_header, FRAME_HEADER_SIZE};
use crate::error::Result;
use crate::pool::BufferPool;

/// Build a complete frame (prefix + payload) in one buffer.
pub fn build_frame(payload: &[u8]) -> Result<Bytes> {
    let prefix = encode_frame_header(payload.len())?;
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.put_slice(&prefix);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Read one frame into `buf`.
///
/// Returns the number of bytes stored, `min(buf.len(), frame length)`. When
/// the frame does not fit, it is read whole into a scratch buffer from `pool`
/// and only the leading part is copied out.
///
/// Not cancel safe once the length prefix has started arriving: dropping the
/// future after that point leaves `reader` in the middle of a frame.
pub async fn read_frame<R>(reader: &mut R, buf: &mut [u8], pool: &BufferPool) -> Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut prefix).await?;
    let len = decode_frame_header(prefix);

    if buf.len() >= len {
        reader.read_exact(&mut buf[..len]).await?;
        return Ok(len);
    }

    let mut scratch = pool.acquire(len);
    reader.read_exact(&mut scratch).await?;

    let n = buf.len();
    buf.copy_from_slice(&scratch[..n]);
    tracing::debug!("datagram truncated: delivered {} of {} bytes", n, len);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::protocol::MAX_DATAGRAM_SIZE;

    #[test]
    fn test_build_frame_too_large() {
        let payload = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert!(matches!(
            build_frame(&payload),
            Err(RelayError::MessageTooLarge(_))
        ));
    }

    #[test]
    fn test_build_empty_frame() {
        assert_eq!(&build_frame(&[]).unwrap()[..], &[0x00, 0x00]);
    }

    #[tokio::test]
    async fn test_read_frame_fits() {
        let pool = BufferPool::new();
        let wire = build_frame(b"hello").unwrap();
        let mut reader = &wire[..];

        let mut buf = [0u8; 10];
        let n = read_frame(&mut reader, &mut buf, &pool).await.unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(pool.idle_count(5), 0);
    }

    #[tokio::test]
    async fn test_read_frame_truncates_and_drops_tail() {
        let pool = BufferPool::new();
        let mut wire = build_frame(b"abcdefgh").unwrap().to_vec();
        wire.extend_from_slice(&build_frame(b"next").unwrap());
        let mut reader = &wire[..];

        let mut small = [0u8; 3];
        let n = read_frame(&mut reader, &mut small, &pool).await.unwrap();
        assert_eq!(n, 3);
        assert_eq!(&small, b"abc");
        // Scratch buffer went back to the pool.
        assert_eq!(pool.idle_count(8), 1);

        // The dropped tail is not delivered by the next read.
        let mut buf = [0u8; 16];
        let n = read_frame(&mut reader, &mut buf, &pool).await.unwrap();
        assert_eq!(&buf[..n], b"next");
    }

    #[tokio::test]
    async fn test_read_frame_short_stream_returns_scratch() {
        let pool = BufferPool::new();
        // Frame claims 10 bytes, only 4 follow.
        let wire = [0x00u8, 0x0A, 1, 2, 3, 4];
        let mut reader = &wire[..];

        let mut small = [0u8; 2];
        let err = read_frame(&mut reader, &mut small, &pool)
            .await
            .unwrap_err();
        assert!(
            matches!(err, RelayError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
        assert_eq!(pool.idle_count(10), 1);
    }

    #[tokio::test]
    async fn test_read_zero_length_frame() {
        let pool = BufferPool::new();
        let wire = [0x00u8, 0x00];
        let mut reader = &wire[..];

        let mut buf = [0u8; 4];
        assert_eq!(read_frame(&mut reader, &mut buf, &pool).await.unwrap(), 0);
    }
}
