//! Implementations of the CLI subcommands.

mod clear;
mod completions;
mod fetch;
mod prefetch;
mod resolve;
mod status;
mod urls;

pub use clear::run_clear;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use prefetch::run_prefetch;
pub use resolve::run_resolve;
pub use status::run_status;
pub use urls::run_urls;

use anyhow::Result;
use pic_core::url_model::Tier;

pub(crate) fn parse_tier(size: &str) -> Result<Tier> {
    Tier::from_name(size)
        .ok_or_else(|| anyhow::anyhow!("unknown size {size:?} (expected thumb, small or big)"))
}
