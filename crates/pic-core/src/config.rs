use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::shard::ShardTable;

/// Pacing for the sequential batch loop (all in milliseconds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after a real download, to stay under the CDN's rate limits.
    pub after_download_ms: u64,
    /// Pause when the item was already cached (no network traffic).
    pub after_cached_ms: u64,
    /// Backoff after a failed item.
    pub after_failure_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_download_ms: 200,
            after_cached_ms: 20,
            after_failure_ms: 500,
        }
    }
}

/// One breakpoint of a shard table override: codes below `upper_bound` map
/// to `shard`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShardRange {
    pub upper_bound: u64,
    pub shard: u32,
}

/// Shard table override (optional section in config.toml). The marketplace
/// redraws its basket ranges periodically; editing this section tracks that
/// without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardTableConfig {
    /// Ascending breakpoints.
    pub ranges: Vec<ShardRange>,
    /// Shard for codes above the highest bound.
    pub catch_all: u32,
}

/// Global configuration loaded from `~/.config/pic/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PicConfig {
    /// Image cache directory; `None` uses `$XDG_CACHE_HOME/pic/images`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// CDN host pattern; `{shard}` is replaced by the zero-padded host number.
    pub host_pattern: String,
    /// Number of known basket hosts swept on fallback.
    pub host_count: u32,
    /// Timeout per HEAD probe, seconds.
    pub probe_timeout_secs: f64,
    /// Overall deadline for one fallback host sweep, seconds.
    pub sweep_deadline_secs: f64,
    /// Timeout per image GET, seconds.
    pub download_timeout_secs: f64,
    /// Probe worker pool size, shared across all concurrent callers.
    pub probe_workers: usize,
    /// Prefetch worker pool size (full downloads, keep small).
    pub prefetch_workers: usize,
    /// Seconds a finished batch progress record stays pollable.
    pub progress_retention_secs: u64,
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Shard table override; `None` uses the built-in ranges.
    #[serde(default)]
    pub shard_table: Option<ShardTableConfig>,
}

impl Default for PicConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            host_pattern: "https://basket-{shard}.wbbasket.ru".to_string(),
            host_count: 32,
            probe_timeout_secs: 2.0,
            sweep_deadline_secs: 5.0,
            download_timeout_secs: 5.0,
            probe_workers: 32,
            prefetch_workers: 8,
            progress_retention_secs: 300,
            pacing: PacingConfig::default(),
            shard_table: None,
        }
    }
}

impl PicConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.probe_timeout_secs)
    }

    pub fn sweep_deadline(&self) -> Duration {
        Duration::from_secs_f64(self.sweep_deadline_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.download_timeout_secs)
    }

    pub fn progress_retention(&self) -> Duration {
        Duration::from_secs(self.progress_retention_secs)
    }

    /// Resolved cache directory (not created here).
    pub fn resolve_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("pic")?;
        Ok(xdg_dirs.get_cache_home().join("images"))
    }

    /// Shard table from the override section, or the built-in ranges.
    pub fn shard_table(&self) -> ShardTable {
        match &self.shard_table {
            Some(cfg) => ShardTable::new(
                cfg.ranges.iter().map(|r| (r.upper_bound, r.shard)).collect(),
                cfg.catch_all,
            ),
            None => ShardTable::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pic")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PicConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PicConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PicConfig = toml::from_str(&data)?;
    Ok(cfg)
}
