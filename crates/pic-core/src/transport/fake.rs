//! Scripted in-memory transport for unit tests.

use super::{FetchResponse, Transport, TransportError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

#[derive(Clone)]
struct Scripted {
    status: u32,
    body: Vec<u8>,
    delay: Option<Duration>,
}

/// Transport whose answers are scripted per URL. Unscripted URLs answer 404,
/// or hang until the caller's timeout when [`hang_unmatched`] is set.
/// Records every request in order for assertions on sweep behavior.
///
/// [`hang_unmatched`]: FakeTransport::hang_unmatched
pub struct FakeTransport {
    scripted: Mutex<HashMap<String, Scripted>>,
    hang: AtomicBool,
    requests: Mutex<Vec<String>>,
    probe_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(HashMap::new()),
            hang: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            probe_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(&self, url: &str, status: u32, body: &[u8]) {
        self.scripted.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                status,
                body: body.to_vec(),
                delay: None,
            },
        );
    }

    pub fn respond_after(&self, url: &str, status: u32, body: &[u8], delay: Duration) {
        self.scripted.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                status,
                body: body.to_vec(),
                delay: Some(delay),
            },
        );
    }

    /// Make every unscripted URL hang until the per-call timeout.
    pub fn hang_unmatched(&self) {
        self.hang.store(true, Ordering::Relaxed);
    }

    /// Requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::Relaxed)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub fn network_calls(&self) -> usize {
        self.probe_calls() + self.fetch_calls()
    }

    fn answer(&self, url: &str, timeout: Duration) -> Result<Scripted, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let scripted = self.scripted.lock().unwrap().get(url).cloned();
        match scripted {
            Some(s) => {
                if let Some(delay) = s.delay {
                    if delay >= timeout {
                        thread::sleep(timeout);
                        return Err(TransportError::Timeout);
                    }
                    thread::sleep(delay);
                }
                Ok(s)
            }
            None if self.hang.load(Ordering::Relaxed) => {
                thread::sleep(timeout);
                Err(TransportError::Timeout)
            }
            None => Ok(Scripted {
                status: 404,
                body: Vec::new(),
                delay: None,
            }),
        }
    }
}

impl Transport for FakeTransport {
    fn probe(&self, url: &str, timeout: Duration) -> Result<u32, TransportError> {
        self.probe_calls.fetch_add(1, Ordering::Relaxed);
        self.answer(url, timeout).map(|s| s.status)
    }

    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.answer(url, timeout).map(|s| FetchResponse {
            status: s.status,
            body: s.body,
        })
    }
}
