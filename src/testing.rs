//! In-crate mock transport that records every write call.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::transport::Transport;

pub(crate) const MOCK_LOCAL: &str = "10.0.0.1:1000";
pub(crate) const MOCK_PEER: &str = "10.0.0.2:2000";

#[derive(Default)]
struct State {
    writes: Vec<Vec<u8>>,
    fail_writes: bool,
    shutdown: bool,
}

/// Shared view of what a [`MockTransport`] saw.
#[derive(Clone, Default)]
pub(crate) struct MockLog(Arc<Mutex<State>>);

impl MockLog {
    /// Each `poll_write` call, in order.
    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().writes.clone()
    }

    /// All written bytes concatenated.
    pub(crate) fn wire(&self) -> Vec<u8> {
        self.writes().concat()
    }

    pub(crate) fn fail_writes(&self) {
        self.0.lock().unwrap().fail_writes = true;
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.0.lock().unwrap().shutdown
    }
}

/// Serves a fixed inbound byte string, then EOF. Writes are logged.
pub(crate) struct MockTransport {
    inbound: Vec<u8>,
    pos: usize,
    log: MockLog,
}

impl MockTransport {
    pub(crate) fn new(inbound: Vec<u8>) -> (Self, MockLog) {
        let log = MockLog::default();
        let mock = Self {
            inbound,
            pos: 0,
            log: log.clone(),
        };
        (mock, log)
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let remaining = &self.inbound[self.pos..];
        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.log.0.lock().unwrap();
        if state.fail_writes {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        state.writes.push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.log.0.lock().unwrap().shutdown = true;
        Poll::Ready(Ok(()))
    }
}

impl Transport for MockTransport {
    fn local_addr(&self) -> Option<SocketAddr> {
        MOCK_LOCAL.parse().ok()
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        MOCK_PEER.parse().ok()
    }
}
