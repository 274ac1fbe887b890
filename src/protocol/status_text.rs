//! Status-code to reason-text lookup.

use super::wire_format::status;

/// Maps a relay status code to a human-readable reason.
///
/// Closures `Fn(u8) -> String` implement this trait, so a custom table can
/// be plugged in without a new type:
///
/// ```
/// use relay_conn::protocol::StatusText;
///
/// let lookup = |code: u8| format!("code-{code}");
/// assert_eq!(lookup.status_text(7), "code-7");
/// ```
pub trait StatusText: Send + Sync {
    fn status_text(&self, code: u8) -> String;
}

impl<F> StatusText for F
where
    F: Fn(u8) -> String + Send + Sync,
{
    fn status_text(&self, code: u8) -> String {
        self(code)
    }
}

/// Reason texts for the standard relay status codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusText;

impl DefaultStatusText {
    /// Static reason for `code`, empty for unknown codes.
    pub fn text(code: u8) -> &'static str {
        match code {
            status::OK => "OK",
            status::BAD_REQUEST => "Bad Request",
            status::UNAUTHORIZED => "Unauthorized",
            status::FORBIDDEN => "Forbidden",
            status::TIMEOUT => "Timeout",
            status::SERVICE_UNAVAILABLE => "Service Unavailable",
            status::HOST_UNREACHABLE => "Host Unreachable",
            status::NETWORK_UNREACHABLE => "Network Unreachable",
            status::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "",
        }
    }
}

impl StatusText for DefaultStatusText {
    fn status_text(&self, code: u8) -> String {
        Self::text(code).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let lookup = DefaultStatusText;
        assert_eq!(lookup.status_text(status::OK), "OK");
        assert_eq!(lookup.status_text(status::FORBIDDEN), "Forbidden");
        assert_eq!(
            lookup.status_text(status::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_unknown_code_is_empty() {
        assert_eq!(DefaultStatusText.status_text(0xEE), "");
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |code: u8| {
            if code == 5 {
                "forbidden".to_string()
            } else {
                String::new()
            }
        };
        assert_eq!(lookup.status_text(5), "forbidden");
    }
}
