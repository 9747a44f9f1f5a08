//! Facade wiring the image pipeline together for the web layer and the CLI.
//!
//! Absence of an image is always a value at this boundary, never an error;
//! the only thing that can fail is construction (the cache directory being
//! unusable). The transport is injected so tests run against a scripted
//! fake instead of the live CDN.

use crate::batch::{BatchItem, BatchOrchestrator, DownloadProgress};
use crate::cache::{CacheStats, ImageCache};
use crate::config::PicConfig;
use crate::fetcher::Fetcher;
use crate::prefetch::Prefetcher;
use crate::prober::{ProbePool, Prober};
use crate::transport::{CurlTransport, Transport};
use crate::url_model::{Tier, UrlBuilder};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Image numbers the catalog supports per product.
const MAX_IMAGE_NUM: u32 = 10;

pub struct PicService {
    cache: ImageCache,
    builder: UrlBuilder,
    prober: Arc<Prober>,
    fetcher: Arc<Fetcher>,
    prefetcher: Prefetcher,
    batches: BatchOrchestrator,
}

impl PicService {
    /// Wire the pipeline from configuration with an injected transport.
    pub fn new(cfg: &PicConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let cache = ImageCache::open(cfg.resolve_cache_dir()?)?;
        let builder = UrlBuilder::new(cfg.host_pattern.clone(), cfg.host_count, cfg.shard_table());
        let pool = Arc::new(ProbePool::new(Arc::clone(&transport), cfg.probe_workers));
        let prober = Arc::new(Prober::new(
            Arc::clone(&transport),
            pool,
            builder.clone(),
            cfg.probe_timeout(),
            cfg.sweep_deadline(),
        ));
        let fetcher = Arc::new(Fetcher::new(
            transport,
            cache.clone(),
            builder.clone(),
            Arc::clone(&prober),
            cfg.download_timeout(),
        ));
        let prefetcher = Prefetcher::new(Arc::clone(&fetcher), cfg.prefetch_workers);
        let batches = BatchOrchestrator::new(Arc::clone(&fetcher), cfg.pacing, cfg.progress_retention());
        Ok(Self {
            cache,
            builder,
            prober,
            fetcher,
            prefetcher,
            batches,
        })
    }

    /// Production wiring over libcurl.
    pub fn with_default_transport(cfg: &PicConfig) -> Result<Self> {
        Self::new(cfg, Arc::new(CurlTransport::new()))
    }

    pub fn url_builder(&self) -> &UrlBuilder {
        &self.builder
    }

    fn clamp_num(num: u32) -> u32 {
        num.clamp(1, MAX_IMAGE_NUM)
    }

    /// Cache-only lookup used to decide whether an image URL can be
    /// advertised to a client. Never touches the network.
    pub fn resolve_display_path(&self, vendor_code: &str, num: u32) -> Option<PathBuf> {
        let num = Self::clamp_num(num);
        if self.cache.has(vendor_code, num) {
            Some(self.cache.path_for(vendor_code, num))
        } else {
            None
        }
    }

    /// Fetch one image, preferring the cache unless `force` is set.
    pub fn fetch(
        &self,
        vendor_code: &str,
        num: u32,
        tier: Tier,
        force: bool,
    ) -> (Option<PathBuf>, bool) {
        self.fetcher
            .fetch_and_cache(vendor_code, Self::clamp_num(num), tier, force)
    }

    /// Re-download over whatever the cache holds.
    pub fn force_refresh(&self, vendor_code: &str, num: u32, tier: Tier) -> Option<PathBuf> {
        self.fetch(vendor_code, num, tier, true).0
    }

    /// First basket host currently serving the image, if any.
    pub fn find_working_url(&self, vendor_code: &str, num: u32, tier: Tier) -> Option<String> {
        self.prober
            .find_working_url(vendor_code, Self::clamp_num(num), tier)
    }

    /// Schedule a background batch for a subject. See [`BatchOrchestrator`].
    pub fn start_batch_for_subject(
        &self,
        subject: &str,
        items: Vec<BatchItem>,
        tier: Tier,
    ) -> bool {
        self.batches.start_batch(subject, items, tier)
    }

    /// Progress for a subject's batch. Unknown subjects read as an idle,
    /// already-finished snapshot, matching what the polling endpoint serves.
    pub fn batch_progress(&self, subject: &str) -> DownloadProgress {
        self.batches
            .progress(subject)
            .unwrap_or_else(DownloadProgress::idle)
    }

    /// Cache-only presence map for UI badges; never triggers downloads.
    /// Input codes are deduplicated.
    pub fn bulk_check_presence(&self, vendor_codes: &[String]) -> HashMap<String, Option<PathBuf>> {
        let mut seen = HashSet::new();
        vendor_codes
            .iter()
            .filter(|code| seen.insert(code.as_str()))
            .map(|code| (code.clone(), self.resolve_display_path(code, 1)))
            .collect()
    }

    /// Bulk warm-up of image #1 for a list of codes. Blocks until done.
    pub fn prefetch(&self, vendor_codes: &[String], tier: Tier) -> HashMap<String, Option<PathBuf>> {
        self.prefetcher.prefetch(vendor_codes, tier)
    }

    /// Wipe the image cache; returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;

    fn fixture() -> (tempfile::TempDir, Arc<FakeTransport>, PicService) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PicConfig {
            cache_dir: Some(dir.path().join("images")),
            probe_timeout_secs: 0.1,
            sweep_deadline_secs: 0.5,
            download_timeout_secs: 0.1,
            ..PicConfig::default()
        };
        let transport = Arc::new(FakeTransport::new());
        let service = PicService::new(&cfg, transport.clone()).unwrap();
        (dir, transport, service)
    }

    #[test]
    fn display_path_is_cache_only() {
        let (_dir, transport, service) = fixture();
        assert_eq!(service.resolve_display_path("100", 1), None);
        assert_eq!(transport.network_calls(), 0);

        let primary = service.url_builder().primary_url("100", 1, Tier::Small);
        transport.respond(&primary, 200, b"img");
        let (path, downloaded) = service.fetch("100", 1, Tier::Small, false);
        assert!(downloaded);
        assert_eq!(service.resolve_display_path("100", 1), path);
    }

    #[test]
    fn image_number_is_clamped_at_the_boundary() {
        let (_dir, transport, service) = fixture();
        let clamped = service.url_builder().primary_url("100", 10, Tier::Small);
        transport.respond(&clamped, 200, b"img");

        let (path, _) = service.fetch("100", 99, Tier::Small, false);
        assert!(path.is_some());
        assert_eq!(service.resolve_display_path("100", 99), path);
        assert!(path.unwrap().ends_with("100_10.webp"));
    }

    #[test]
    fn bulk_presence_dedups_and_never_fetches() {
        let (_dir, transport, service) = fixture();
        let primary = service.url_builder().primary_url("1", 1, Tier::Small);
        transport.respond(&primary, 200, b"img");
        service.fetch("1", 1, Tier::Small, false);
        let baseline = transport.network_calls();

        let codes: Vec<String> = ["1", "2", "1"].iter().map(|s| s.to_string()).collect();
        let presence = service.bulk_check_presence(&codes);
        assert_eq!(presence.len(), 2);
        assert!(presence["1"].is_some());
        assert!(presence["2"].is_none());
        assert_eq!(transport.network_calls(), baseline);
    }

    #[test]
    fn unknown_subject_reports_idle_progress() {
        let (_dir, _transport, service) = fixture();
        let progress = service.batch_progress("nobody");
        assert!(progress.finished);
        assert_eq!(progress.total, 0);
    }

    #[test]
    fn force_refresh_overwrites_cached_bytes() {
        let (_dir, transport, service) = fixture();
        let primary = service.url_builder().primary_url("100", 1, Tier::Small);
        transport.respond(&primary, 200, b"old");
        service.fetch("100", 1, Tier::Small, false);

        transport.respond(&primary, 200, b"new");
        let path = service.force_refresh("100", 1, Tier::Small).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }
}
