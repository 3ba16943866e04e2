use std::env;

use anyhow::{Context, Result};
use ags_formats::ClibArchive;

fn main() -> Result<()> {
    env_logger::init();
    let path = env::args()
        .nth(1)
        .context("usage: clib_dump <archive>")?;
    let archive = ClibArchive::open(&path).with_context(|| format!("opening {path}"))?;
    let header = archive.header();
    println!(
        "{} entries in {} (CLIB v{}, base {:#x})",
        archive.entries().len(),
        archive.path().display(),
        header.format_version,
        header.base_offset
    );
    for (index, volume) in archive.volume_names().enumerate() {
        println!("  volume {index}: {volume}");
    }
    for entry in archive.entries() {
        println!(
            "{name:<40} {archive:>3} {offset:>10} {size:>10}",
            name = entry.name,
            archive = entry.archive,
            offset = entry.offset,
            size = entry.size
        );
    }
    Ok(())
}
