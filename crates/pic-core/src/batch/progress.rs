//! Per-batch progress counters polled by the web layer.

use serde::Serialize;
use std::time::Instant;

/// Snapshot of one batch: how many items exist, how many are done, and
/// whether the loop has finished. Serializes to the JSON shape the polling
/// endpoint expects; the completion timestamp stays server-side (it only
/// drives record pruning).
#[derive(Debug, Clone, Serialize)]
pub struct DownloadProgress {
    pub total: usize,
    pub current: usize,
    pub finished: bool,
    #[serde(skip)]
    pub finished_at: Option<Instant>,
}

impl DownloadProgress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            finished: false,
            finished_at: None,
        }
    }

    /// Snapshot reported for a subject with no known batch: nothing to do,
    /// already finished.
    pub fn idle() -> Self {
        Self {
            total: 0,
            current: 0,
            finished: true,
            finished_at: None,
        }
    }
}
