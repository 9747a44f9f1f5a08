//! RAII guard that releases a batch's subject when the loop ends.

use super::BatchState;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Clears the in-flight flag and stamps completion when dropped, so even a
/// panicking batch loop releases its subject and leaves a pollable
/// "finished" record behind.
pub(super) struct FinishGuard {
    pub(super) state: Arc<Mutex<BatchState>>,
    pub(super) subject: String,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.active.remove(&self.subject);
        if let Some(progress) = state.progress.get_mut(&self.subject) {
            progress.finished = true;
            progress.finished_at = Some(Instant::now());
        }
    }
}
