//! HTTP transport seam: HEAD probes and body GETs against CDN hosts.
//!
//! The client is constructed explicitly and injected into the prober and
//! fetcher, so tests can substitute a scripted fake. HTTP statuses are data,
//! not errors; [`TransportError`] covers connection-level failures only, so
//! callers can tell a definitive 404 from a reset or a timeout.

mod curl;
mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use self::curl::CurlTransport;
pub use error::TransportError;

use std::time::Duration;

/// Status and body of one GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// True for 2xx statuses.
pub fn is_success(status: u32) -> bool {
    (200..300).contains(&status)
}

/// Minimal HTTP surface the image pipeline needs.
pub trait Transport: Send + Sync {
    /// Lightweight existence check, no body transfer. Returns the HTTP status.
    fn probe(&self, url: &str, timeout: Duration) -> Result<u32, TransportError>;

    /// Full body download. Returns status and body bytes.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError>;
}
