//! `pic status` – show cache statistics.

use anyhow::Result;
use pic_core::service::PicService;

pub fn run_status(service: &PicService, json: bool) -> Result<()> {
    let stats = service.cache_stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("entries:     {}", stats.entries);
        println!("total bytes: {}", stats.total_bytes);
    }
    Ok(())
}
