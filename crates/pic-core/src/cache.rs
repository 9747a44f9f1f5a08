//! Disk cache for product images.
//!
//! One file per `(vendor code, image number)` pair, content exactly the bytes
//! served by the CDN. Commits write a unique temp file in the cache directory
//! and rename it into place, so a reader never observes a truncated image.
//! Zero-byte files count as absent: a leftover from a failed past write must
//! not surface as a broken link.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache file extension; everything else in the directory is ignored.
const IMAGE_EXT: &str = "webp";

/// Content-addressed-by-code image store on one filesystem directory.
/// Cheap to clone; safe for concurrent readers and non-overlapping writers.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

/// Totals reported by [`ImageCache::stats`].
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
}

impl ImageCache {
    /// Open (and create if missing) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create image cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic location for a pair; existence is not implied.
    pub fn path_for(&self, vendor_code: &str, num: u32) -> PathBuf {
        self.dir.join(format!("{vendor_code}_{num}.{IMAGE_EXT}"))
    }

    /// True only for an existing file with non-zero size. Any stat error
    /// reads as absent, failing toward a re-fetch.
    pub fn has(&self, vendor_code: &str, num: u32) -> bool {
        fs::metadata(self.path_for(vendor_code, num))
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Atomically write `bytes` for a pair and return the final path.
    ///
    /// Empty bodies are refused: committing them would turn a failed
    /// download into a permanent cache hit.
    pub fn commit(&self, vendor_code: &str, num: u32, bytes: &[u8]) -> Result<PathBuf> {
        if bytes.is_empty() {
            anyhow::bail!("refusing to cache empty body for {vendor_code}_{num}");
        }
        let final_path = self.path_for(vendor_code, num);

        // Unique temp file in the same directory so the rename stays on one
        // filesystem and concurrent commits for the same pair cannot clobber
        // each other's partial writes.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        tmp.write_all(bytes)
            .with_context(|| format!("failed to write image for {vendor_code}_{num}"))?;
        tmp.as_file()
            .sync_all()
            .context("failed to sync image before rename")?;
        tmp.persist(&final_path)
            .with_context(|| format!("failed to commit {}", final_path.display()))?;
        Ok(final_path)
    }

    /// Remove every cached image, best-effort: a single locked or vanished
    /// file is logged and skipped, never fatal. Returns the number removed.
    pub fn clear(&self) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("cache clear: cannot read {}: {}", self.dir.display(), e);
                return 0;
            }
        };
        let mut removed = 0usize;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IMAGE_EXT) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("cache clear: cannot remove {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Entry count and total byte size of the cache.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return stats,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IMAGE_EXT) {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                stats.entries += 1;
                stats.total_bytes += meta.len();
            }
        }
        stats
    }
}
