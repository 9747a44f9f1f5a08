//! `pic urls` – print the predicted URL and the fallback sweep.

use super::parse_tier;
use crate::cli::ImageArgs;
use anyhow::Result;
use pic_core::service::PicService;

pub fn run_urls(service: &PicService, code: &str, image: &ImageArgs) -> Result<()> {
    let tier = parse_tier(&image.size)?;
    let builder = service.url_builder();

    println!("primary: {}", builder.primary_url(code, image.num, tier));
    println!("fallback sweep:");
    for (i, url) in builder
        .candidate_urls(code, image.num, tier)
        .iter()
        .enumerate()
    {
        println!("{:>3}: {}", i + 1, url);
    }
    Ok(())
}
