//! Handshake response check.
//!
//! The relay answers a connect/bind request with a [`Response`] record. Client
//! wrappers do not wait for it at connect time; instead the first read on the
//! connection consumes and validates it through [`DeferredHandshake`].

use std::io;
use std::sync::{Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::OnceCell;

use super::status_text::StatusText;
use super::wire_format::{Response, RESPONSE_SIZE, VERSION_1};
use crate::error::{RelayError, Result};

/// Read one response record and turn a failure status into an error.
///
/// A version mismatch stops parsing with [`RelayError::BadVersion`]. A non-OK
/// status yields [`RelayError::Status`] with the text from `status_text`.
pub async fn read_response<R>(reader: &mut R, status_text: &dyn StatusText) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let resp = Response::read_from(reader).await?;
    validate(resp, status_text)
}

fn validate(resp: Response, status_text: &dyn StatusText) -> Result<()> {
    if resp.version != VERSION_1 {
        return Err(RelayError::BadVersion(resp.version));
    }

    if !resp.is_ok() {
        return Err(RelayError::Status {
            code: resp.status,
            text: status_text.status_text(resp.status),
        });
    }

    Ok(())
}

/// Record bytes received so far.
#[derive(Debug, Default)]
struct PartialRecord {
    bytes: [u8; RESPONSE_SIZE],
    filled: usize,
}

/// Exactly-once response check shared by every reader of a connection.
///
/// The first caller of [`check`](Self::check) reads the response; concurrent
/// callers wait on the same cell and every caller sees the stored outcome.
/// A failure is sticky: later reads keep reporting it and the record is never
/// parsed twice.
///
/// # Cancel safety
///
/// `check` is cancel safe. Record bytes that arrived before the future was
/// dropped are kept, and the next call resumes after them.
#[derive(Debug, Default)]
pub struct DeferredHandshake {
    outcome: OnceCell<Option<RelayError>>,
    record: Mutex<PartialRecord>,
}

impl DeferredHandshake {
    /// Create a pending check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a check that is already satisfied.
    pub fn completed() -> Self {
        Self {
            outcome: OnceCell::new_with(Some(None)),
            record: Mutex::default(),
        }
    }

    /// Run the check on first use, then replay its outcome.
    pub async fn check<R>(&self, reader: &mut R, status_text: &dyn StatusText) -> Result<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let outcome = self
            .outcome
            .get_or_init(|| async move {
                let res = self
                    .read_record(reader)
                    .await
                    .and_then(|resp| validate(resp, status_text));
                match res {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::debug!("relay handshake failed: {}", e);
                        Some(e)
                    }
                }
            })
            .await;

        match outcome {
            None => Ok(()),
            Some(e) => Err(e.replay()),
        }
    }

    /// Whether the response has already been consumed.
    pub fn is_done(&self) -> bool {
        self.outcome.initialized()
    }

    // Each completed read is recorded before the next await.
    async fn read_record<R>(&self, reader: &mut R) -> Result<Response>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut chunk = [0u8; RESPONSE_SIZE];
        loop {
            let filled = self.progress().filled;
            if filled == RESPONSE_SIZE {
                break;
            }

            let n = reader.read(&mut chunk[..RESPONSE_SIZE - filled]).await?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }

            let mut record = self.progress();
            record.bytes[filled..filled + n].copy_from_slice(&chunk[..n]);
            record.filled += n;
        }

        let bytes = self.progress().bytes;
        Ok(Response::new(bytes[0], bytes[1]))
    }

    fn progress(&self) -> MutexGuard<'_, PartialRecord> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }
}
