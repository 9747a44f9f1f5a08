//! `pic clear` – wipe the image cache.

use anyhow::Result;
use pic_core::service::PicService;

pub fn run_clear(service: &PicService) -> Result<()> {
    let removed = service.clear_cache();
    println!("removed {removed} cached images");
    Ok(())
}
