//! Availability prober: find a basket host that actually serves an image.
//!
//! The common case is one HEAD against the URL the shard table predicts.
//! Only when that fails does the prober fan out over the remaining hosts
//! through the shared worker pool, racing them under an overall deadline.
//! First success wins; the losers are cancelled and their answers dropped.

mod pool;

pub use pool::{ProbeOutcome, ProbePool};

use crate::transport::{is_success, Transport};
use crate::url_model::{Tier, UrlBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Resolves the first reachable candidate URL for an image.
pub struct Prober {
    transport: Arc<dyn Transport>,
    pool: Arc<ProbePool>,
    builder: UrlBuilder,
    probe_timeout: Duration,
    sweep_deadline: Duration,
}

impl Prober {
    pub fn new(
        transport: Arc<dyn Transport>,
        pool: Arc<ProbePool>,
        builder: UrlBuilder,
        probe_timeout: Duration,
        sweep_deadline: Duration,
    ) -> Self {
        Self {
            transport,
            pool,
            builder,
            probe_timeout,
            sweep_deadline,
        }
    }

    /// First URL answering 2xx to a HEAD, or `None` when no host does before
    /// the deadline. Per-probe timeouts and network errors read as "not
    /// reachable"; they never abort the remaining candidates.
    pub fn find_working_url(&self, vendor_code: &str, num: u32, tier: Tier) -> Option<String> {
        let primary = self.builder.primary_url(vendor_code, num, tier);
        if matches!(
            self.transport.probe(&primary, self.probe_timeout),
            Ok(status) if is_success(status)
        ) {
            return Some(primary);
        }

        let candidates: Vec<String> = self
            .builder
            .candidate_urls(vendor_code, num, tier)
            .into_iter()
            .filter(|url| *url != primary)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        tracing::debug!(
            "primary host miss for {vendor_code}, sweeping {} candidates",
            candidates.len()
        );
        self.sweep(candidates)
    }

    /// Race the candidates through the shared pool. The calling thread waits
    /// on the reply channel and always returns by the deadline; a losing probe
    /// still in flight finishes inside the pool and its reply is dropped.
    fn sweep(&self, candidates: Vec<String>) -> Option<String> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (reply_tx, reply_rx) = mpsc::channel();
        let submitted = candidates.len();
        for url in candidates {
            self.pool.submit(pool::ProbeJob {
                url,
                timeout: self.probe_timeout,
                cancel: Arc::clone(&cancel),
                reply: reply_tx.clone(),
            });
        }
        drop(reply_tx);

        let deadline = Instant::now() + self.sweep_deadline;
        let mut received = 0usize;
        while received < submitted {
            let left = deadline.saturating_duration_since(Instant::now());
            match reply_rx.recv_timeout(left) {
                Ok(outcome) => {
                    received += 1;
                    if outcome.reachable {
                        cancel.store(true, Ordering::Relaxed);
                        return Some(outcome.url);
                    }
                }
                // Deadline hit or the pool tore down: either way, stop
                // consuming and mark the stragglers cancelled.
                Err(_) => break,
            }
        }
        cancel.store(true, Ordering::Relaxed);
        None
    }
}
