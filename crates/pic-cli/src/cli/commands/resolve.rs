//! `pic resolve` – probe the basket hosts for a working image URL.

use super::parse_tier;
use crate::cli::ImageArgs;
use anyhow::Result;
use pic_core::service::PicService;

pub fn run_resolve(service: &PicService, code: &str, image: &ImageArgs) -> Result<()> {
    let tier = parse_tier(&image.size)?;
    match service.find_working_url(code, image.num, tier) {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => anyhow::bail!("no basket host is serving image {} of {code}", image.num),
    }
}
