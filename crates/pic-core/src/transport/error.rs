//! Transport error type and libcurl error classification.

use std::fmt;

/// Connection-level failure of one HTTP operation. Classified so logs and
/// retry decisions can separate a slow host from a dead one.
#[derive(Debug)]
pub enum TransportError {
    /// Connect or transfer timed out.
    Timeout,
    /// Network-level failure (DNS, refused, reset, truncated read).
    Connection(String),
    /// Anything else (TLS, bad URL, protocol violation).
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "timed out"),
            TransportError::Connection(msg) => write!(f, "connection failed: {msg}"),
            TransportError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            return TransportError::Timeout;
        }
        if e.is_couldnt_connect()
            || e.is_couldnt_resolve_host()
            || e.is_couldnt_resolve_proxy()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_send_error()
            || e.is_got_nothing()
        {
            return TransportError::Connection(e.to_string());
        }
        TransportError::Other(e.to_string())
    }
}
