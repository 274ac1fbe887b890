//! Wire format encoding and decoding.
//!
//! Handshake response record, sent once by the relay:
//! ```text
//! ┌─────────┬────────┐
//! │ Version │ Status │
//! │ 1 byte  │ 1 byte │
//! └─────────┴────────┘
//! ```
//!
//! Datagram frame, repeated per message:
//! ```text
//! ┌──────────┬───────────────┐
//! │ Length L │ Payload       │
//! │ uint16 BE│ L bytes       │
//! └──────────┴───────────────┘
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{RelayError, Result};

/// Response record size in bytes (fixed, exactly 2).
pub const RESPONSE_SIZE: usize = 2;

/// The only relay protocol version this crate speaks.
pub const VERSION_1: u8 = 0x01;

/// Datagram length prefix size in bytes.
pub const FRAME_HEADER_SIZE: usize = 2;

/// Largest payload a single datagram frame can carry.
pub const MAX_DATAGRAM_SIZE: usize = u16::MAX as usize;

/// Relay status codes.
pub mod status {
    /// Request accepted.
    pub const OK: u8 = 0x00;
    /// Malformed request.
    pub const BAD_REQUEST: u8 = 0x01;
    /// Authentication required or failed.
    pub const UNAUTHORIZED: u8 = 0x02;
    /// Authenticated but not allowed.
    pub const FORBIDDEN: u8 = 0x03;
    /// Relay timed out reaching the target.
    pub const TIMEOUT: u8 = 0x04;
    /// Relay cannot serve the request right now.
    pub const SERVICE_UNAVAILABLE: u8 = 0x05;
    pub const HOST_UNREACHABLE: u8 = 0x06;
    pub const NETWORK_UNREACHABLE: u8 = 0x07;
    pub const INTERNAL_SERVER_ERROR: u8 = 0x08;
}

/// Decoded handshake response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// Protocol version chosen by the relay.
    pub version: u8,
    /// Status code (see [`status`]).
    pub status: u8,
}

impl Response {
    /// Create a new response record.
    pub fn new(version: u8, status: u8) -> Self {
        Self { version, status }
    }

    /// Successful version-1 response.
    pub fn ok() -> Self {
        Self::new(VERSION_1, status::OK)
    }

    /// Encode to wire bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use relay_conn::protocol::{Response, status, VERSION_1};
    ///
    /// let bytes = Response::new(VERSION_1, status::FORBIDDEN).encode();
    /// assert_eq!(bytes, [0x01, 0x03]);
    /// ```
    pub fn encode(&self) -> [u8; RESPONSE_SIZE] {
        [self.version, self.status]
    }

    /// Decode from wire bytes.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < RESPONSE_SIZE {
            return None;
        }
        Some(Self::new(buf[0], buf[1]))
    }

    /// Read exactly one response record from `reader`.
    pub async fn read_from<R>(reader: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = [0u8; RESPONSE_SIZE];
        reader.read_exact(&mut buf).await?;
        Ok(Self::new(buf[0], buf[1]))
    }

    /// Check if the status is OK.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == status::OK
    }
}

/// Encode a datagram length prefix.
///
/// Fails with [`RelayError::MessageTooLarge`] when `len` exceeds
/// [`MAX_DATAGRAM_SIZE`].
#[inline]
pub fn encode_frame_header(len: usize) -> Result<[u8; FRAME_HEADER_SIZE]> {
    let len = u16::try_from(len).map_err(|_| RelayError::MessageTooLarge(len))?;
    Ok(len.to_be_bytes())
}

/// Decode a datagram length prefix.
#[inline]
pub fn decode_frame_header(buf: [u8; FRAME_HEADER_SIZE]) -> usize {
    u16::from_be_bytes(buf) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decode() {
        let resp = Response::decode(&[0x01, 0x00]).unwrap();
        assert_eq!(resp, Response::ok());
        assert!(resp.is_ok());
    }

    #[test]
    fn test_response_decode_too_short() {
        assert!(Response::decode(&[0x01]).is_none());
    }

    #[test]
    fn test_response_not_ok() {
        let resp = Response::new(VERSION_1, status::HOST_UNREACHABLE);
        assert!(!resp.is_ok());
        assert_eq!(resp.encode(), [0x01, 0x06]);
    }

    #[tokio::test]
    async fn test_read_from_consumes_only_record() {
        let data = [0x01u8, 0x00, 0xAA, 0xBB];
        let mut reader = &data[..];

        let resp = Response::read_from(&mut reader).await.unwrap();
        assert_eq!(resp, Response::ok());
        assert_eq!(reader, &[0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn test_read_from_short_stream() {
        let data = [0x01u8];
        let mut reader = &data[..];

        let err = Response::read_from(&mut reader).await.unwrap_err();
        assert!(
            matches!(err, RelayError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn test_frame_header_big_endian() {
        assert_eq!(encode_frame_header(3).unwrap(), [0x00, 0x03]);
        assert_eq!(encode_frame_header(0x0102).unwrap(), [0x01, 0x02]);
        assert_eq!(decode_frame_header([0x01, 0x02]), 0x0102);
    }

    #[test]
    fn test_frame_header_limits() {
        assert_eq!(encode_frame_header(0).unwrap(), [0x00, 0x00]);
        assert_eq!(encode_frame_header(MAX_DATAGRAM_SIZE).unwrap(), [0xFF, 0xFF]);

        let err = encode_frame_header(MAX_DATAGRAM_SIZE + 1).unwrap_err();
        assert!(matches!(err, RelayError::MessageTooLarge(65536)));
    }
}
