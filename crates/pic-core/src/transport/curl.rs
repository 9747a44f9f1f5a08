//! libcurl-backed transport.
//!
//! One Easy handle per operation; probes use `nobody(true)` so no body is
//! transferred. Redirects are followed (basket hosts occasionally bounce
//! between mirrors).

use super::{FetchResponse, Transport, TransportError};
use std::time::Duration;

/// Default request headers: the CDN serves browsers, so look like one.
fn default_headers() -> Vec<(String, String)> {
    vec![
        (
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        ),
        (
            "Accept".to_string(),
            "image/webp,image/apng,image/*,*/*;q=0.8".to_string(),
        ),
        (
            "Accept-Language".to_string(),
            "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        ),
    ]
}

/// Transport over libcurl easy handles.
pub struct CurlTransport {
    headers: Vec<(String, String)>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self {
            headers: default_headers(),
        }
    }

    /// Replace the default header set (e.g. to drop the browser disguise).
    pub fn with_headers(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str, timeout: Duration) -> Result<(), TransportError> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(timeout)?;
        easy.timeout(timeout)?;

        let mut list = curl::easy::List::new();
        for (k, v) in &self.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !self.headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(())
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for CurlTransport {
    fn probe(&self, url: &str, timeout: Duration) -> Result<u32, TransportError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url, timeout)?;
        easy.nobody(true)?; // HEAD request
        easy.perform()?;
        Ok(easy.response_code()?)
    }

    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url, timeout)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(FetchResponse { status, body })
    }
}
