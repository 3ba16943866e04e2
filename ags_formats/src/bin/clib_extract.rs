use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ags_formats::{ClibArchive, ClibEntry, ErrorKind};
use clap::Parser;
use log::{debug, warn};

#[derive(Parser, Debug)]
#[command(
    about = "Extract the files of a CLIB archive, one directory per volume",
    version
)]
struct Args {
    /// Master archive: game executable, .ags file or a .vox library
    archive: PathBuf,

    /// Destination directory; each volume gets a subdirectory named after its file
    #[arg(long, value_name = "DIR", default_value = "extracted")]
    dest: PathBuf,

    /// Entry names to extract (case-insensitive, may repeat)
    #[arg(long = "asset", value_name = "NAME")]
    assets: Vec<String>,

    /// Overwrite existing files instead of skipping them
    #[arg(long)]
    overwrite: bool,
}

/// Outcome for one volume of the archive.
#[derive(Debug, Default, PartialEq, Eq)]
struct VolumeReport {
    dir: PathBuf,
    extracted: usize,
    skipped: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let archive = open_archive(&args.archive)?;
    let header = archive.header();
    println!(
        "{}: CLIB v{}, base offset {:#x}, {} entries",
        archive.path().display(),
        header.format_version,
        header.base_offset,
        archive.entries().len()
    );
    for (index, name) in archive.volume_names().enumerate() {
        let path = archive
            .volume_path(index)
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        println!("  volume {index}: {name} ({path})");
    }

    let selection = select_entries(&archive, &args.assets)?;
    let reports = extract(&archive, &selection, &args.dest, args.overwrite)?;
    for report in &reports {
        println!(
            "  {}: {} extracted, {} skipped",
            report.dir.display(),
            report.extracted,
            report.skipped
        );
    }
    Ok(())
}

fn open_archive(path: &Path) -> Result<ClibArchive> {
    match ClibArchive::open(path) {
        Ok(archive) => Ok(archive),
        Err(err) if err.kind() == ErrorKind::Unimplemented => bail!(
            "{} uses an archive format this tool cannot read yet ({err})",
            path.display()
        ),
        Err(err) => Err(err).with_context(|| format!("opening archive {}", path.display())),
    }
}

/// Entries to extract: every entry when `assets` is empty, otherwise the
/// named ones. Names the archive lacks are reported; asking only for missing
/// names is an error.
fn select_entries<'a>(
    archive: &'a ClibArchive,
    assets: &[String],
) -> Result<Vec<&'a ClibEntry>> {
    if assets.is_empty() {
        return Ok(archive.entries().iter().collect());
    }
    let mut selected = Vec::new();
    let mut missing = Vec::new();
    let wanted: BTreeSet<String> = assets
        .iter()
        .map(|asset| asset.trim().to_ascii_lowercase())
        .collect();
    for name in &wanted {
        match archive.find_entry(name) {
            Some(entry) => selected.push(entry),
            None => {
                warn!("{} has no entry named {name}", archive.path().display());
                missing.push(name.as_str());
            }
        }
    }
    if selected.is_empty() {
        bail!(
            "none of the requested entries are in {}: {}",
            archive.path().display(),
            missing.join(", ")
        );
    }
    Ok(selected)
}

/// Directory name for volume `index`: the volume's file name on disk, which
/// for the master is the opened file rather than its recorded name.
fn volume_dir(archive: &ClibArchive, index: usize) -> String {
    archive
        .volume_path(index)
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| format!("volume{index}"))
}

/// CLIB names are flat; anything that looks like a path keeps only its last
/// component.
fn entry_file_name(entry: &ClibEntry) -> Option<&str> {
    entry
        .name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

fn extract(
    archive: &ClibArchive,
    entries: &[&ClibEntry],
    dest: &Path,
    overwrite: bool,
) -> Result<Vec<VolumeReport>> {
    let mut reports: Vec<VolumeReport> = archive
        .volume_names()
        .enumerate()
        .map(|(index, _)| VolumeReport {
            dir: dest.join(volume_dir(archive, index)),
            ..VolumeReport::default()
        })
        .collect();

    for entry in entries {
        let Some(name) = entry_file_name(entry) else {
            warn!("skipping entry with unusable name {:?}", entry.name);
            continue;
        };
        let report = &mut reports[entry.archive];
        let target = report.dir.join(name);
        if target.exists() && !overwrite {
            debug!("{} exists, skipping", target.display());
            report.skipped += 1;
            continue;
        }
        fs::create_dir_all(&report.dir)
            .with_context(|| format!("creating {}", report.dir.display()))?;
        archive
            .extract_entry(entry, &target)
            .with_context(|| format!("extracting {}", entry.name))?;
        report.extracted += 1;
    }

    reports.retain(|report| report.extracted + report.skipped > 0);
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use ags_formats::ClibBuilder;
    use tempfile::tempdir;

    use super::*;

    fn two_volume_game(dir: &Path) -> ClibArchive {
        let mut builder = ClibBuilder::new(20);
        builder.master_name("game.exe");
        let music = builder.add_volume("MUSIC.001");
        builder.add_file("game28.dta", b"descriptor".to_vec());
        builder.add_file("sound1.wav", b"RIFF".to_vec());
        builder.add_file_in("music1.ogg", music, b"OggS".to_vec());
        let built = builder.build().unwrap();
        fs::write(dir.join("game.exe"), &built.master).unwrap();
        for (name, bytes) in &built.volumes {
            fs::write(dir.join(name.to_ascii_lowercase()), bytes).unwrap();
        }
        ClibArchive::open(dir.join("game.exe")).unwrap()
    }

    #[test]
    fn entries_land_in_the_directory_of_their_volume() {
        let game = tempdir().unwrap();
        let out = tempdir().unwrap();
        let archive = two_volume_game(game.path());

        let entries = select_entries(&archive, &[]).unwrap();
        let reports = extract(&archive, &entries, out.path(), false).unwrap();
        assert_eq!(
            reports,
            vec![
                VolumeReport {
                    dir: out.path().join("game.exe"),
                    extracted: 2,
                    skipped: 0,
                },
                VolumeReport {
                    dir: out.path().join("music.001"),
                    extracted: 1,
                    skipped: 0,
                },
            ]
        );
        assert_eq!(
            fs::read(out.path().join("music.001").join("music1.ogg")).unwrap(),
            b"OggS"
        );
        assert_eq!(
            fs::read(out.path().join("game.exe").join("game28.dta")).unwrap(),
            b"descriptor"
        );

        let again = extract(&archive, &entries, out.path(), false).unwrap();
        assert!(again.iter().all(|report| report.extracted == 0));
        assert_eq!(again.iter().map(|report| report.skipped).sum::<usize>(), 3);
    }

    #[test]
    fn asset_selection_is_case_insensitive() {
        let game = tempdir().unwrap();
        let out = tempdir().unwrap();
        let archive = two_volume_game(game.path());

        let entries =
            select_entries(&archive, &["MUSIC1.OGG".to_string(), "nope.wav".to_string()])
                .unwrap();
        assert_eq!(entries.len(), 1);
        let reports = extract(&archive, &entries, out.path(), false).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!out.path().join("game.exe").exists());

        let err = select_entries(&archive, &["nope.wav".to_string()]).unwrap_err();
        assert!(err.to_string().contains("nope.wav"));
    }

    #[test]
    fn v21_archives_get_a_clear_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.ags");
        let mut data = b"CLIB\x1a\x15\x00".to_vec();
        data.extend_from_slice(&[0u8; 16]);
        fs::write(&path, data).unwrap();

        let err = open_archive(&path).unwrap_err();
        assert!(err.to_string().contains("cannot read yet"));
        assert!(open_archive(&dir.path().join("absent.ags")).is_err());
    }
}
