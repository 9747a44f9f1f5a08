//! `pic prefetch` – warm the cache for a list of vendor codes.

use super::parse_tier;
use anyhow::Result;
use pic_core::service::PicService;

pub fn run_prefetch(service: &PicService, codes: &[String], size: &str) -> Result<()> {
    let tier = parse_tier(size)?;
    let results = service.prefetch(codes, tier);

    let mut sorted: Vec<&String> = results.keys().collect();
    sorted.sort();

    let mut cached = 0usize;
    println!("{:<14} PATH", "CODE");
    for code in &sorted {
        match &results[*code] {
            Some(path) => {
                cached += 1;
                println!("{:<14} {}", code, path.display());
            }
            None => println!("{:<14} -", code),
        }
    }
    println!("{cached}/{} images cached", results.len());
    Ok(())
}
