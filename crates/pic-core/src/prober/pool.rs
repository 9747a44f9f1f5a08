//! Shared bounded worker pool for HEAD probes.
//!
//! Probes are short and mostly I/O-wait, so the pool is sized generously and
//! shared by every concurrent resolution call; a single call's fan-out never
//! spawns threads of its own. A cancelled job is acknowledged without
//! touching the network so callers can still account for every submission.

use crate::transport::{is_success, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One candidate probe handed to the pool.
pub(crate) struct ProbeJob {
    pub url: String,
    pub timeout: Duration,
    pub cancel: Arc<AtomicBool>,
    pub reply: mpsc::Sender<ProbeOutcome>,
}

/// Result of one candidate probe; consumed only within the issuing call.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub url: String,
    pub reachable: bool,
}

/// Long-lived probe workers behind an unbounded submission queue.
/// Workers exit when the pool (and with it the sender) is dropped.
pub struct ProbePool {
    tx: mpsc::Sender<ProbeJob>,
}

impl ProbePool {
    pub fn new(transport: Arc<dyn Transport>, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<ProbeJob>();
        let rx = Arc::new(Mutex::new(rx));
        for _ in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let transport = Arc::clone(&transport);
            thread::spawn(move || worker_loop(rx, transport));
        }
        Self { tx }
    }

    pub(crate) fn submit(&self, job: ProbeJob) {
        // Send only fails when every worker has exited, i.e. during teardown.
        let _ = self.tx.send(job);
    }
}

fn worker_loop(rx: Arc<Mutex<mpsc::Receiver<ProbeJob>>>, transport: Arc<dyn Transport>) {
    loop {
        let job = {
            let rx = match rx.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            match rx.recv() {
                Ok(job) => job,
                Err(_) => return,
            }
        };

        if job.cancel.load(Ordering::Relaxed) {
            let _ = job.reply.send(ProbeOutcome {
                url: job.url,
                reachable: false,
            });
            continue;
        }

        let reachable = matches!(
            transport.probe(&job.url, job.timeout),
            Ok(status) if is_success(status)
        );
        // The issuing call may be gone already (deadline hit); that is fine.
        let _ = job.reply.send(ProbeOutcome {
            url: job.url,
            reachable,
        });
    }
}
