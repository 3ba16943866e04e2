//! Version-specific index bodies. Each decoder starts right after the version
//! byte (and chain byte for v10+) and leaves the cursor at the end of the
//! index, which for v6 is also where file data begins.

use crate::cipher;
use crate::error::{Error, Result};
use crate::reader::Cursor;

const V6_NAME_LEN: usize = 13;
const V10_ARCHIVE_NAME_LEN: usize = 20;
const V10_FILE_NAME_LEN: usize = 25;
const V20_ARCHIVE_NAME_LEN: usize = 50;

#[derive(Debug, Clone)]
pub(crate) struct IndexBody {
    /// Declared constituent archives. Empty for v6, where the master is the
    /// only archive.
    pub archive_names: Vec<String>,
    pub files: Vec<IndexedFile>,
}

#[derive(Debug, Clone)]
pub(crate) struct IndexedFile {
    pub name: String,
    pub archive: usize,
    pub offset: u64,
    pub size: u64,
}

pub(crate) fn read_index(cursor: &mut Cursor<'_>, version: u8) -> Result<IndexBody> {
    match version {
        6 => read_v6(cursor),
        10 | 11 | 15 => read_fixed_width(cursor, version >= 11),
        20 => read_v20(cursor),
        21 => Err(Error::Unimplemented {
            feature: "v21 archive index encryption",
        }),
        other => Err(Error::UnsupportedVersion {
            format: "CLIB",
            version: other as u32,
        }),
    }
}

fn read_v6(cursor: &mut Cursor<'_>) -> Result<IndexBody> {
    cursor.enter("clib v6 header");
    let modifier = cursor.read_u8()?;
    let _unused = cursor.read_u8()?;
    let count = cursor.read_u16()? as usize;
    cursor.skip(V6_NAME_LEN)?;

    cursor.enter("clib v6 names");
    cursor.expect_records(count, V6_NAME_LEN + 4 + 2)?;
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = cursor.position();
        let stored = cursor.read_bytes(V6_NAME_LEN)?;
        let plain = cipher::decode_shifted(stored, modifier).ok_or(Error::UnterminatedString {
            section: "clib v6 names",
            offset,
            max_len: V6_NAME_LEN,
        })?;
        names.push(crate::reader::decode_text(&plain));
    }

    cursor.enter("clib v6 sizes");
    let mut sizes = Vec::with_capacity(count);
    for _ in 0..count {
        sizes.push(cursor.read_u32()? as u64);
    }
    // per-file flags and compression ratio, unused
    cursor.skip(2 * count)?;

    let mut offset = cursor.position() as u64;
    let files = names
        .into_iter()
        .zip(sizes)
        .map(|(name, size)| {
            let file = IndexedFile {
                name,
                archive: 0,
                offset,
                size,
            };
            offset += size;
            file
        })
        .collect();

    Ok(IndexBody {
        archive_names: Vec::new(),
        files,
    })
}

fn read_fixed_width(cursor: &mut Cursor<'_>, obfuscated: bool) -> Result<IndexBody> {
    cursor.enter("clib archive names");
    let archive_count = cursor.read_count()?;
    cursor.expect_records(archive_count, V10_ARCHIVE_NAME_LEN)?;
    let mut archive_names = Vec::with_capacity(archive_count);
    for _ in 0..archive_count {
        archive_names.push(cursor.read_fixed_string(V10_ARCHIVE_NAME_LEN)?);
    }

    cursor.enter("clib file names");
    let file_count = cursor.read_count()?;
    cursor.expect_records(file_count, V10_FILE_NAME_LEN + 4 + 4 + 1)?;
    let mut names = Vec::with_capacity(file_count);
    for _ in 0..file_count {
        let name = if obfuscated {
            let offset = cursor.position();
            let stored = cursor.read_bytes(V10_FILE_NAME_LEN)?;
            decrypt_name(stored, "clib file names", offset)?
        } else {
            cursor.read_fixed_string(V10_FILE_NAME_LEN)?
        };
        names.push(name);
    }

    let files = read_file_tables(cursor, names)?;
    Ok(IndexBody {
        archive_names,
        files,
    })
}

fn read_v20(cursor: &mut Cursor<'_>) -> Result<IndexBody> {
    cursor.enter("clib archive names");
    let archive_count = cursor.read_count()?;
    cursor.expect_records(archive_count, 1)?;
    let mut archive_names = Vec::with_capacity(archive_count);
    for _ in 0..archive_count {
        archive_names.push(cursor.read_c_string(V20_ARCHIVE_NAME_LEN)?);
    }

    cursor.enter("clib file names");
    let file_count = cursor.read_count()?;
    cursor.expect_records(file_count, 2 + 4 + 4 + 1)?;
    let mut names = Vec::with_capacity(file_count);
    for _ in 0..file_count {
        // the stored length is five times the real one
        let len = (cursor.read_u16()? / 5) as usize;
        let offset = cursor.position();
        let stored = cursor.read_bytes(len)?;
        names.push(decrypt_name(stored, "clib file names", offset)?);
    }

    let files = read_file_tables(cursor, names)?;
    Ok(IndexBody {
        archive_names,
        files,
    })
}

/// Parallel offset, size and archive-index arrays shared by v10 and later.
fn read_file_tables(cursor: &mut Cursor<'_>, names: Vec<String>) -> Result<Vec<IndexedFile>> {
    let count = names.len();
    cursor.enter("clib file offsets");
    let offsets = cursor.read_i32_vec(count)?;
    cursor.enter("clib file sizes");
    let sizes = cursor.read_i32_vec(count)?;
    cursor.enter("clib file archives");
    let archives = cursor.read_bytes(count)?;

    let mut files = Vec::with_capacity(count);
    for (index, name) in names.into_iter().enumerate() {
        let offset = u64::try_from(offsets[index]).map_err(|_| {
            Error::corrupt(
                "clib file offsets",
                format!("file {name} has negative offset {}", offsets[index]),
            )
        })?;
        let size = u64::try_from(sizes[index]).map_err(|_| {
            Error::corrupt(
                "clib file sizes",
                format!("file {name} has negative size {}", sizes[index]),
            )
        })?;
        files.push(IndexedFile {
            name,
            archive: archives[index] as usize,
            offset,
            size,
        });
    }
    Ok(files)
}

fn decrypt_name(stored: &[u8], section: &'static str, offset: usize) -> Result<String> {
    let plain = cipher::decrypt(cipher::ARCHIVE_NAME_KEY, stored).ok_or(
        Error::UnterminatedString {
            section,
            offset,
            max_len: stored.len(),
        },
    )?;
    Ok(crate::reader::decode_text(&plain))
}
