//! Background pre-fetch batches, one per subject key.
//!
//! A batch walks its items sequentially on a dedicated thread, pacing each
//! step so the CDN never sees a burst. The only shared mutable state is the
//! registry of active subjects and progress records behind one mutex; the
//! membership check and the in-flight mark happen under the same lock, so
//! two near-simultaneous starts for a subject cannot both pass.

mod guard;
mod progress;

pub use progress::DownloadProgress;

use crate::config::PacingConfig;
use crate::fetcher::Fetcher;
use crate::url_model::Tier;
use guard::FinishGuard;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Processing class of one batch item. Ready goods are fetched first: those
/// are the rows the operator is about to hand over the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPriority {
    Ready,
    OnWay,
    Other,
}

impl BatchPriority {
    fn rank(self) -> u8 {
        match self {
            BatchPriority::Ready => 0,
            BatchPriority::OnWay => 1,
            BatchPriority::Other => 2,
        }
    }
}

/// One unit of batch work.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub vendor_code: String,
    pub priority: BatchPriority,
}

#[derive(Default)]
pub(crate) struct BatchState {
    pub(crate) active: HashSet<String>,
    pub(crate) progress: HashMap<String, DownloadProgress>,
}

impl BatchState {
    /// Drop finished records older than the retention window. Called on each
    /// batch start so the map cannot grow without bound.
    fn prune_finished(&mut self, retention: Duration) {
        let now = Instant::now();
        self.progress.retain(|_, p| {
            !(p.finished
                && p.finished_at
                    .is_some_and(|at| now.duration_since(at) > retention))
        });
    }
}

pub struct BatchOrchestrator {
    fetcher: Arc<Fetcher>,
    state: Arc<Mutex<BatchState>>,
    pacing: PacingConfig,
    retention: Duration,
}

impl BatchOrchestrator {
    pub fn new(fetcher: Arc<Fetcher>, pacing: PacingConfig, retention: Duration) -> Self {
        Self {
            fetcher,
            state: Arc::new(Mutex::new(BatchState::default())),
            pacing,
            retention,
        }
    }

    /// Schedule a batch for `subject`. Returns `false` when one is already in
    /// flight for that subject; the caller's items are dropped, not queued.
    /// Returns immediately once the background thread is spawned.
    pub fn start_batch(&self, subject: &str, mut items: Vec<BatchItem>, tier: Tier) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            state.prune_finished(self.retention);
            if !state.active.insert(subject.to_string()) {
                tracing::debug!("batch already in flight for {subject}");
                return false;
            }
            state
                .progress
                .insert(subject.to_string(), DownloadProgress::new(items.len()));
        }

        if items.is_empty() {
            // Nothing to schedule; leave a finished record behind.
            drop(FinishGuard {
                state: Arc::clone(&self.state),
                subject: subject.to_string(),
            });
            return true;
        }

        // Stable sort: caller order survives within a priority class.
        items.sort_by_key(|item| item.priority.rank());

        let state = Arc::clone(&self.state);
        let fetcher = Arc::clone(&self.fetcher);
        let pacing = self.pacing;
        let owned_subject = subject.to_string();
        let spawned = thread::Builder::new()
            .name(format!("pic-batch-{subject}"))
            .spawn(move || {
                let subject = owned_subject;
                tracing::info!("batch start for {subject}: {} items", items.len());
                let _guard = FinishGuard {
                    state: Arc::clone(&state),
                    subject: subject.clone(),
                };
                run_batch(&state, &fetcher, &subject, &items, tier, pacing);
                tracing::info!("batch finished for {subject}");
            });

        if let Err(e) = spawned {
            tracing::error!("cannot spawn batch thread for {subject}: {e}");
            drop(FinishGuard {
                state: Arc::clone(&self.state),
                subject: subject.to_string(),
            });
            return false;
        }
        true
    }

    /// Progress record for a subject, if one exists (running or retained).
    pub fn progress(&self, subject: &str) -> Option<DownloadProgress> {
        self.state.lock().unwrap().progress.get(subject).cloned()
    }
}

/// Sequential item loop. Per-item failures pace and continue; only the
/// surrounding guard handles anything worse.
fn run_batch(
    state: &Arc<Mutex<BatchState>>,
    fetcher: &Fetcher,
    subject: &str,
    items: &[BatchItem],
    tier: Tier,
    pacing: PacingConfig,
) {
    for (done, item) in items.iter().enumerate() {
        let (path, downloaded) = fetcher.fetch_and_cache(&item.vendor_code, 1, tier, false);

        {
            let mut state = state.lock().unwrap();
            if let Some(progress) = state.progress.get_mut(subject) {
                progress.current = done + 1;
            }
        }

        let pause_ms = if downloaded {
            pacing.after_download_ms
        } else if path.is_some() {
            pacing.after_cached_ms
        } else {
            pacing.after_failure_ms
        };
        thread::sleep(Duration::from_millis(pause_ms));
    }
}
