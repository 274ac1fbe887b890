//! Per-connection configuration.

use std::fmt;
use std::sync::Arc;

use crate::pool::BufferPool;
use crate::protocol::{DefaultStatusText, StatusText};

/// Collaborators and switches shared by relay connection wrappers.
///
/// Cheap to clone; connections accepted from one listener usually share one.
#[derive(Clone)]
pub struct RelayConfig {
    /// Turns failure status codes into reason text.
    pub status_text: Arc<dyn StatusText>,
    /// Scratch buffers for oversized frames.
    pub pool: Arc<BufferPool>,
    /// Whether client wrappers consume the relay response on first read.
    /// Default: true
    pub response_check: bool,
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom status-text lookup.
    pub fn with_status_text<S>(mut self, status_text: S) -> Self
    where
        S: StatusText + 'static,
    {
        self.status_text = Arc::new(status_text);
        self
    }

    /// Use a specific buffer pool instead of the global one.
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Enable or disable the deferred response check.
    pub fn with_response_check(mut self, enabled: bool) -> Self {
        self.response_check = enabled;
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            status_text: Arc::new(DefaultStatusText),
            pool: BufferPool::global(),
            response_check: true,
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("pool", &self.pool)
            .field("response_check", &self.response_check)
            .finish_non_exhaustive()
    }
}
