//! CLIB resource archives: the master game archive (optionally appended to an
//! executable) and the `*.vox` audio libraries share this format.

mod builder;
mod index;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use memmap2::{Mmap, MmapOptions};

use crate::error::{Error, Result};
use crate::reader::Cursor;

pub use builder::{BuiltArchive, ClibBuilder};

pub const CLIB_MAGIC: &[u8; 4] = b"CLIB";
const TRAILER_LEN: usize = 16;
const TRAILER_CONSTANT: [u8; 4] = [1, 2, 3, 4];
const TRAILER_SIGNATURE: &[u8; 4] = b"SIGE";

pub const SUPPORTED_VERSIONS: [u8; 6] = [6, 10, 11, 15, 20, 21];

/// Archive name that always denotes the master archive itself.
pub const MASTER_SENTINEL: &str = "ac2game.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterHeader {
    pub format_version: u8,
    /// Position of the `CLIB` magic inside the master file; non-zero when the
    /// archive is appended to an executable.
    pub base_offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClibEntry {
    pub name: String,
    pub archive: usize,
    pub offset: u64,
    pub size: u64,
}

impl ClibEntry {
    pub fn data_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        let end = start + self.size as usize;
        start..end
    }
}

#[derive(Debug)]
enum VolumeSource {
    Master,
    File(Mmap),
}

#[derive(Debug)]
struct Volume {
    name: String,
    path: PathBuf,
    source: VolumeSource,
}

/// Bounded, seekable view of one archived file.
pub type EntryStream<'a> = io::Cursor<&'a [u8]>;

#[derive(Debug)]
pub struct ClibArchive {
    path: PathBuf,
    master: Mmap,
    header: MasterHeader,
    volumes: Vec<Volume>,
    entries: Vec<ClibEntry>,
    by_name: HashMap<String, usize>,
}

impl ClibArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)
            .map_err(|err| Error::io(format!("opening archive {}", path_buf.display()), err))?;
        let master = unsafe { MmapOptions::new().map(&file) }.map_err(|err| {
            Error::io(
                format!("memory-mapping archive {}", path_buf.display()),
                err,
            )
        })?;

        let base_offset = locate_base(&master)?;
        let mut cursor = Cursor::new(&master[base_offset as usize..]);
        cursor.enter("clib header");
        cursor.skip(CLIB_MAGIC.len() + 1)?;
        let format_version = cursor.read_u8()?;
        if !SUPPORTED_VERSIONS.contains(&format_version) {
            return Err(Error::UnsupportedVersion {
                format: "CLIB",
                version: format_version as u32,
            });
        }
        if format_version >= 10 {
            let position = cursor.read_u8()?;
            if position != 0 {
                return Err(Error::NotFirstInChain { position });
            }
        }
        let header = MasterHeader {
            format_version,
            base_offset,
        };
        debug!(
            "{}: CLIB v{format_version} at base {base_offset:#x}",
            path_buf.display()
        );

        let body = index::read_index(&mut cursor, format_version)?;

        let master_name = path_buf
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let volumes = if body.archive_names.is_empty() {
            vec![Volume {
                name: master_name,
                path: path_buf.clone(),
                source: VolumeSource::Master,
            }]
        } else {
            attach_volumes(&path_buf, &master_name, &body.archive_names)?
        };

        let mut archive = ClibArchive {
            path: path_buf,
            master,
            header,
            volumes,
            entries: Vec::with_capacity(body.files.len()),
            by_name: HashMap::with_capacity(body.files.len()),
        };

        for file in body.files {
            let volume = archive
                .volumes
                .get(file.archive)
                .ok_or_else(|| Error::InvalidArchiveIndex {
                    name: file.name.clone(),
                    archive: file.archive,
                    archive_count: archive.volumes.len(),
                })?;
            let offset = match volume.source {
                VolumeSource::Master => file.offset + base_offset,
                VolumeSource::File(_) => file.offset,
            };
            let len = archive.volume_bytes(file.archive).len() as u64;
            if offset.checked_add(file.size).is_none_or(|end| end > len) {
                return Err(Error::EntryOutOfRange {
                    name: file.name,
                    archive: volume.name.clone(),
                    offset,
                    size: file.size,
                    len,
                });
            }

            let index = archive.entries.len();
            archive
                .by_name
                .entry(file.name.to_ascii_lowercase())
                .or_insert(index);
            archive.entries.push(ClibEntry {
                name: file.name,
                archive: file.archive,
                offset,
                size: file.size,
            });
        }

        Ok(archive)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> MasterHeader {
        self.header
    }

    pub fn entries(&self) -> &[ClibEntry] {
        &self.entries
    }

    /// Names of the constituent archives in index order.
    pub fn volume_names(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().map(|volume| volume.name.as_str())
    }

    pub fn volume_path(&self, archive: usize) -> Option<&Path> {
        self.volumes.get(archive).map(|volume| volume.path.as_path())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find_entry(name).is_some()
    }

    pub fn find_entry(&self, name: &str) -> Option<&ClibEntry> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&index| &self.entries[index])
    }

    pub fn read_entry_bytes(&self, entry: &ClibEntry) -> &[u8] {
        &self.volume_bytes(entry.archive)[entry.data_range()]
    }

    /// Bytes of a logical file, or `None` when the archive has no such file.
    pub fn read_bytes(&self, name: &str) -> Option<&[u8]> {
        self.find_entry(name)
            .map(|entry| self.read_entry_bytes(entry))
    }

    /// Seekable view of a logical file, or `None` when the archive has no such file.
    pub fn open_stream(&self, name: &str) -> Option<EntryStream<'_>> {
        self.read_bytes(name).map(io::Cursor::new)
    }

    pub fn extract_entry<P: AsRef<Path>>(&self, entry: &ClibEntry, dest: P) -> Result<()> {
        let bytes = self.read_entry_bytes(entry);
        let dest = dest.as_ref();
        let mut file = File::create(dest)
            .map_err(|err| Error::io(format!("creating {}", dest.display()), err))?;
        file.write_all(bytes)
            .map_err(|err| Error::io(format!("writing {}", dest.display()), err))?;
        Ok(())
    }

    fn volume_bytes(&self, archive: usize) -> &[u8] {
        match &self.volumes[archive].source {
            VolumeSource::Master => &self.master,
            VolumeSource::File(map) => map,
        }
    }
}

/// Find where the `CLIB` block starts: either at offset 0 or at the offset
/// recorded in the trailer of an executable it was appended to.
fn locate_base(bytes: &[u8]) -> Result<u64> {
    if bytes.starts_with(CLIB_MAGIC) {
        return Ok(0);
    }
    if bytes.len() < TRAILER_LEN {
        return Err(Error::BadMagic {
            expected: "CLIB",
            offset: 0,
        });
    }

    let mut cursor = Cursor::new(&bytes[bytes.len() - TRAILER_LEN..]);
    cursor.enter("clib trailer");
    let base = cursor.read_u32()? as u64;
    let magic = cursor.read_array::<4>()?;
    let constant = cursor.read_array::<4>()?;
    let signature = cursor.read_array::<4>()?;
    if &magic != CLIB_MAGIC || constant != TRAILER_CONSTANT || &signature != TRAILER_SIGNATURE {
        return Err(Error::BadTrailer);
    }

    let start = base as usize;
    if bytes.get(start..start + CLIB_MAGIC.len()) != Some(CLIB_MAGIC.as_slice()) {
        return Err(Error::BadMagic {
            expected: "CLIB",
            offset: base,
        });
    }
    Ok(base)
}

fn attach_volumes(master_path: &Path, master_name: &str, names: &[String]) -> Result<Vec<Volume>> {
    let dir = master_path.parent().unwrap_or_else(|| Path::new("."));
    let mut volumes = Vec::with_capacity(names.len());
    for name in names {
        if name.eq_ignore_ascii_case(MASTER_SENTINEL) || name.eq_ignore_ascii_case(master_name) {
            volumes.push(Volume {
                name: name.clone(),
                path: master_path.to_path_buf(),
                source: VolumeSource::Master,
            });
            continue;
        }

        let path = resolve_case_insensitive(dir, name).ok_or_else(|| {
            Error::io(
                format!("opening archive volume {name} next to {}", master_path.display()),
                io::Error::from(io::ErrorKind::NotFound),
            )
        })?;
        let file = File::open(&path)
            .map_err(|err| Error::io(format!("opening archive volume {}", path.display()), err))?;
        let map = unsafe { MmapOptions::new().map(&file) }
            .map_err(|err| Error::io(format!("memory-mapping {}", path.display()), err))?;
        volumes.push(Volume {
            name: name.clone(),
            path,
            source: VolumeSource::File(map),
        });
    }
    Ok(volumes)
}

fn resolve_case_insensitive(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(exact);
    }
    let found = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.file_name()
                .and_then(|file| file.to_str())
                .map(|file| file.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        });
    if let Some(path) = &found {
        warn!(
            "archive volume {name} matched {} only case-insensitively",
            path.display()
        );
    }
    found
}
