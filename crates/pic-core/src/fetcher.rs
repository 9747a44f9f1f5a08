//! Download-and-commit path: resolve a URL, GET the body, cache it.
//!
//! The cache is consulted first and is the source of truth; a hit means zero
//! network traffic. A definitive 404 is an expected outcome (products without
//! photos), never logged as an error and never negative-cached, so a later
//! call may retry once the upstream catalog catches up.

use crate::cache::ImageCache;
use crate::prober::Prober;
use crate::transport::{is_success, Transport};
use crate::url_model::{Tier, UrlBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: ImageCache,
    builder: UrlBuilder,
    prober: Arc<Prober>,
    download_timeout: Duration,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: ImageCache,
        builder: UrlBuilder,
        prober: Arc<Prober>,
        download_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            builder,
            prober,
            download_timeout,
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Fetch one image into the cache. Returns the cached path (or `None`
    /// when the image is unavailable) and whether a download happened now.
    ///
    /// With `force` set the cache check is skipped and a fresh body is
    /// committed over the existing entry.
    pub fn fetch_and_cache(
        &self,
        vendor_code: &str,
        num: u32,
        tier: Tier,
        force: bool,
    ) -> (Option<PathBuf>, bool) {
        if !force && self.cache.has(vendor_code, num) {
            return (Some(self.cache.path_for(vendor_code, num)), false);
        }

        // A failed HEAD sweep does not prove a GET will fail too, so fall
        // back to the predicted URL rather than giving up outright.
        let url = self
            .prober
            .find_working_url(vendor_code, num, tier)
            .unwrap_or_else(|| self.builder.primary_url(vendor_code, num, tier));

        match self.transport.fetch(&url, self.download_timeout) {
            Ok(resp) if is_success(resp.status) => {
                if resp.body.is_empty() {
                    tracing::warn!("empty body for {vendor_code} from {url}");
                    return (None, false);
                }
                match self.cache.commit(vendor_code, num, &resp.body) {
                    Ok(path) => {
                        tracing::debug!(
                            "cached {vendor_code}_{num} ({} bytes) from {url}",
                            resp.body.len()
                        );
                        (Some(path), true)
                    }
                    Err(e) => {
                        tracing::warn!("cache commit failed for {vendor_code}_{num}: {e:#}");
                        (None, false)
                    }
                }
            }
            Ok(resp) if resp.status == 404 => {
                tracing::debug!("no image for {vendor_code}_{num} at {url}");
                (None, false)
            }
            Ok(resp) => {
                tracing::warn!("HTTP {} for {vendor_code} from {url}", resp.status);
                (None, false)
            }
            Err(e) => {
                tracing::warn!("download failed for {vendor_code} from {url}: {e}");
                (None, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prober::ProbePool;
    use crate::shard::ShardTable;
    use crate::transport::fake::FakeTransport;

    struct Fixture {
        _dir: tempfile::TempDir,
        transport: Arc<FakeTransport>,
        fetcher: Fetcher,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::open(dir.path().join("images")).unwrap();
        let builder = UrlBuilder::new(
            "https://basket-{shard}.wbbasket.ru",
            32,
            ShardTable::default(),
        );
        let transport = Arc::new(FakeTransport::new());
        let pool = Arc::new(ProbePool::new(transport.clone(), 32));
        let prober = Arc::new(Prober::new(
            transport.clone(),
            pool,
            builder.clone(),
            Duration::from_millis(100),
            Duration::from_millis(2_000),
        ));
        let fetcher = Fetcher::new(
            transport.clone(),
            cache,
            builder,
            prober,
            Duration::from_millis(100),
        );
        Fixture {
            _dir: dir,
            transport,
            fetcher,
        }
    }

    fn builder() -> UrlBuilder {
        UrlBuilder::new(
            "https://basket-{shard}.wbbasket.ru",
            32,
            ShardTable::default(),
        )
    }

    #[test]
    fn cold_cache_falls_back_to_working_host_then_hits_cache() {
        let f = fixture();
        // Primary (basket-01 for code 100) is gone; host #7 still serves it.
        let winner = builder().candidate_urls("100", 1, Tier::Small)[6].clone();
        f.transport.respond(&winner, 200, b"image-bytes");

        let (path, downloaded) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert_eq!(path, Some(f.fetcher.cache().path_for("100", 1)));
        assert!(downloaded);

        // Second call answers from the cache with zero network traffic.
        let before = f.transport.network_calls();
        let (path2, downloaded2) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert_eq!(path2, path);
        assert!(!downloaded2);
        assert_eq!(f.transport.network_calls(), before);
    }

    #[test]
    fn missing_everywhere_is_unavailable_not_error() {
        let f = fixture();
        let (path, downloaded) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert_eq!(path, None);
        assert!(!downloaded);
        assert!(!f.fetcher.cache().has("100", 1));
    }

    #[test]
    fn force_refresh_redownloads_over_cache_hit() {
        let f = fixture();
        let primary = builder().primary_url("100", 1, Tier::Small);
        f.transport.respond(&primary, 200, b"v1");
        let (_, downloaded) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert!(downloaded);

        f.transport.respond(&primary, 200, b"v2");
        let (path, downloaded) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, true);
        assert!(downloaded);
        assert_eq!(std::fs::read(path.unwrap()).unwrap(), b"v2");
    }

    #[test]
    fn empty_success_body_is_not_cached() {
        let f = fixture();
        let primary = builder().primary_url("100", 1, Tier::Small);
        f.transport.respond(&primary, 200, b"");

        let (path, downloaded) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert_eq!(path, None);
        assert!(!downloaded);
        assert!(!f.fetcher.cache().has("100", 1));
    }

    #[test]
    fn get_is_attempted_even_when_no_probe_succeeds() {
        let f = fixture();
        // HEAD answers 404 everywhere but GET on the primary works; the
        // fetcher must still try the deterministic guess.
        let primary = builder().primary_url("100", 1, Tier::Small);
        let before_fetches = f.transport.fetch_calls();
        let (path, _) = f.fetcher.fetch_and_cache("100", 1, Tier::Small, false);
        assert_eq!(path, None);
        assert_eq!(f.transport.fetch_calls(), before_fetches + 1);
        assert!(f.transport.requests().contains(&primary));
    }
}
