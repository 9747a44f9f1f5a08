//! Bulk cache warm-up: fetch image #1 for a list of vendor codes.
//!
//! Each job is a full download, so the worker count stays in the single
//! digits; the generous fan-out budget belongs to the HEAD probe pool, not
//! here. Workers drain a shared queue and report per-code results over a
//! channel.

use crate::fetcher::Fetcher;
use crate::url_model::Tier;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

pub struct Prefetcher {
    fetcher: Arc<Fetcher>,
    workers: usize,
}

impl Prefetcher {
    pub fn new(fetcher: Arc<Fetcher>, workers: usize) -> Self {
        Self { fetcher, workers }
    }

    /// Warm the cache for every distinct code in `codes`. Blocks until all
    /// jobs finish and returns the cached path per code (`None` when the
    /// image is unavailable). Already-cached codes cost no network traffic.
    pub fn prefetch(&self, codes: &[String], tier: Tier) -> HashMap<String, Option<PathBuf>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = codes
            .iter()
            .filter(|code| seen.insert(code.as_str()))
            .cloned()
            .collect();
        if unique.is_empty() {
            return HashMap::new();
        }

        let count = unique.len();
        let work: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(unique.into_iter().collect()));
        let (tx, rx) = mpsc::channel();
        let num_workers = self.workers.max(1).min(count);

        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let tx = tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            handles.push(thread::spawn(move || loop {
                let code = match work.lock().unwrap().pop_front() {
                    Some(code) => code,
                    None => break,
                };
                let (path, _) = fetcher.fetch_and_cache(&code, 1, tier, false);
                let _ = tx.send((code, path));
            }));
        }
        drop(tx);

        let mut results = HashMap::with_capacity(count);
        for (code, path) in rx {
            results.insert(code, path);
        }
        for handle in handles {
            let _ = handle.join();
        }
        results
    }
}
