//! `pic fetch` – download one image into the cache.

use super::parse_tier;
use crate::cli::ImageArgs;
use anyhow::Result;
use pic_core::service::PicService;

pub fn run_fetch(service: &PicService, code: &str, image: &ImageArgs, force: bool) -> Result<()> {
    let tier = parse_tier(&image.size)?;
    let (path, downloaded) = service.fetch(code, image.num, tier, force);
    match path {
        Some(path) => {
            let origin = if downloaded { "downloaded" } else { "cached" };
            println!("{} ({origin})", path.display());
            Ok(())
        }
        None => anyhow::bail!("image {} of {code} is unavailable", image.num),
    }
}
