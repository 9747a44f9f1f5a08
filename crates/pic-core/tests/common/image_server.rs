//! Minimal HTTP/1.1 server for integration tests against the curl transport.
//!
//! Serves a fixed path -> body map. HEAD answers with Content-Length only;
//! GET answers with the body; unknown paths answer 404. An optional response
//! delay simulates a host that accepts connections but never gets around to
//! answering.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageServerOptions {
    /// Sleep this long before answering any request.
    pub response_delay: Option<Duration>,
}

/// Starts a server in a background thread serving `images` (path -> body).
/// Returns the base URL without a trailing slash, e.g. "http://127.0.0.1:12345".
/// The server runs until the process exits.
pub fn start(images: HashMap<String, Vec<u8>>) -> String {
    start_with_options(images, ImageServerOptions::default())
}

pub fn start_with_options(images: HashMap<String, Vec<u8>>, opts: ImageServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let images = Arc::new(images);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let images = Arc::clone(&images);
            thread::spawn(move || handle(stream, &images, opts));
        }
    });
    format!("http://127.0.0.1:{port}")
}

fn handle(
    mut stream: std::net::TcpStream,
    images: &HashMap<String, Vec<u8>>,
    opts: ImageServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    if let Some(delay) = opts.response_delay {
        thread::sleep(delay);
    }

    let body = match images.get(path) {
        Some(body) => body,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: image/webp\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(body);
    }
}
