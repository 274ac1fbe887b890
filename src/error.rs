//! Error types for relay-conn.

use std::io;

use thiserror::Error;

/// Main error type for all relay connection operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay answered with a protocol version we do not speak.
    #[error("bad version: {0:#04x}")]
    BadVersion(u8),

    /// The relay answered with a non-OK status code.
    #[error("{code} {text}")]
    Status {
        /// Numeric status code from the response record.
        code: u8,
        /// Human-readable reason from the status-text lookup.
        text: String,
    },

    /// Datagram payload does not fit in a 16-bit length prefix.
    #[error("write: data maximum exceeded ({0} bytes)")]
    MessageTooLarge(usize),

    /// The connection was closed locally.
    #[error("use of closed connection")]
    Closed,

    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RelayError {
    /// Status code carried by a [`RelayError::Status`] error.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            RelayError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Rebuild an equivalent error so a stored outcome can be handed to
    /// several callers. I/O errors keep their kind and message.
    pub(crate) fn replay(&self) -> RelayError {
        match self {
            RelayError::BadVersion(v) => RelayError::BadVersion(*v),
            RelayError::Status { code, text } => RelayError::Status {
                code: *code,
                text: text.clone(),
            },
            RelayError::MessageTooLarge(n) => RelayError::MessageTooLarge(*n),
            RelayError::Closed => RelayError::Closed,
            RelayError::Io(e) => RelayError::Io(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl From<RelayError> for io::Error {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Io(e) => e,
            too_large @ RelayError::MessageTooLarge(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, too_large)
            }
            RelayError::Closed => io::Error::new(io::ErrorKind::NotConnected, RelayError::Closed),
            other => io::Error::new(io::ErrorKind::ConnectionRefused, other),
        }
    }
}

/// Result type alias using RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = RelayError::Status {
            code: 5,
            text: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "5 forbidden");
        assert_eq!(err.status_code(), Some(5));
    }

    #[test]
    fn test_replay_keeps_io_kind() {
        let err = RelayError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "early eof"));
        let copy = err.replay();
        match copy {
            RelayError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
                assert!(e.to_string().contains("early eof"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = RelayError::MessageTooLarge(70_000).into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);

        let io_err: io::Error = RelayError::BadVersion(2).into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(io_err.to_string(), "bad version: 0x02");

        let io_err: io::Error = RelayError::Closed.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotConnected);
    }
}
