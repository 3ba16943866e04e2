use crate::cipher;
use crate::error::{Error, Result};
use crate::writer::Writer;

use super::{CLIB_MAGIC, MASTER_SENTINEL, TRAILER_CONSTANT, TRAILER_SIGNATURE};

const V6_PASSWORD_MODIFIER: u8 = 0x1F;

#[derive(Debug, Clone)]
struct PendingFile {
    name: String,
    archive: usize,
    data: Vec<u8>,
}

/// Authoring side of the archive format, used to produce fixtures and
/// repacked archives. Files in volume 0 are stored inside the master; other
/// volumes are emitted as raw data blobs.
#[derive(Debug, Clone)]
pub struct ClibBuilder {
    version: u8,
    volumes: Vec<String>,
    files: Vec<PendingFile>,
    prefix: Vec<u8>,
    forced_archive: Vec<(usize, u8)>,
}

#[derive(Debug, Clone)]
pub struct BuiltArchive {
    pub master: Vec<u8>,
    /// Secondary volumes as `(name, bytes)`, in index order.
    pub volumes: Vec<(String, Vec<u8>)>,
}

impl ClibBuilder {
    pub fn new(version: u8) -> Self {
        Self {
            version,
            volumes: vec![MASTER_SENTINEL.to_string()],
            files: Vec::new(),
            prefix: Vec::new(),
            forced_archive: Vec::new(),
        }
    }

    /// Name recorded for volume 0 (the master itself).
    pub fn master_name(&mut self, name: &str) -> &mut Self {
        self.volumes[0] = name.to_string();
        self
    }

    pub fn add_volume(&mut self, name: &str) -> usize {
        self.volumes.push(name.to_string());
        self.volumes.len() - 1
    }

    pub fn add_file(&mut self, name: &str, data: Vec<u8>) -> &mut Self {
        self.add_file_in(name, 0, data)
    }

    pub fn add_file_in(&mut self, name: &str, archive: usize, data: Vec<u8>) -> &mut Self {
        self.files.push(PendingFile {
            name: name.to_string(),
            archive,
            data,
        });
        self
    }

    /// Prepend `prefix` (an executable image) and append the end trailer.
    pub fn executable_prefix(&mut self, prefix: Vec<u8>) -> &mut Self {
        self.prefix = prefix;
        self
    }

    /// Record a different archive index than the file's real one. Only useful
    /// for producing corrupt fixtures.
    pub fn force_archive_index(&mut self, file: usize, archive: u8) -> &mut Self {
        self.forced_archive.push((file, archive));
        self
    }

    pub fn build(&self) -> Result<BuiltArchive> {
        match self.version {
            6 => self.build_v6(),
            10 | 11 | 15 | 20 => self.build_indexed(),
            other => Err(Error::UnsupportedVersion {
                format: "CLIB writer",
                version: other as u32,
            }),
        }
    }

    fn build_v6(&self) -> Result<BuiltArchive> {
        if self.volumes.len() > 1 || self.files.iter().any(|file| file.archive != 0) {
            return Err(Error::corrupt(
                "clib writer",
                "v6 archives cannot reference other volumes",
            ));
        }
        let mut out = self.header();
        out.u8(V6_PASSWORD_MODIFIER)
            .u8(0)
            .u16(self.files.len() as u16)
            .zeros(13);
        for file in &self.files {
            let mut stored = cipher::encode_shifted(file.name.as_bytes(), V6_PASSWORD_MODIFIER);
            stored.resize(13, 0);
            out.bytes(&stored);
        }
        for file in &self.files {
            out.u32(file.data.len() as u32);
        }
        out.zeros(2 * self.files.len());
        for file in &self.files {
            out.bytes(&file.data);
        }
        Ok(self.finish(out, Vec::new()))
    }

    fn build_indexed(&self) -> Result<BuiltArchive> {
        // offsets of master-resident files depend on the index length, which
        // does not depend on the offset values
        let placeholder = vec![0u32; self.files.len()];
        let index_len = self.index(&placeholder)?.position();

        let mut cursors = vec![0u32; self.volumes.len()];
        cursors[0] = index_len as u32;
        let mut offsets = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let cursor = cursors.get_mut(file.archive).ok_or_else(|| {
                Error::corrupt("clib writer", format!("{} has no volume", file.name))
            })?;
            offsets.push(*cursor);
            *cursor += file.data.len() as u32;
        }

        let mut out = self.index(&offsets)?;
        let mut volumes: Vec<(String, Vec<u8>)> = self.volumes[1..]
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        for file in &self.files {
            if file.archive == 0 {
                out.bytes(&file.data);
            } else {
                volumes[file.archive - 1].1.extend_from_slice(&file.data);
            }
        }
        Ok(self.finish(out, volumes))
    }

    fn index(&self, offsets: &[u32]) -> Result<Writer> {
        let mut out = self.header();
        out.i32(self.volumes.len() as i32);
        for name in &self.volumes {
            if self.version >= 20 {
                out.c_str(name);
            } else {
                out.fixed_str(name, 20);
            }
        }

        out.i32(self.files.len() as i32);
        for file in &self.files {
            if self.version >= 20 {
                let sealed = cipher::encrypt(cipher::ARCHIVE_NAME_KEY, file.name.as_bytes());
                out.u16((sealed.len() * 5) as u16).bytes(&sealed);
            } else if self.version >= 11 {
                let mut sealed = cipher::encrypt(cipher::ARCHIVE_NAME_KEY, file.name.as_bytes());
                if sealed.len() > 25 {
                    return Err(Error::corrupt(
                        "clib writer",
                        format!("{} is too long for a fixed-width index", file.name),
                    ));
                }
                sealed.resize(25, 0);
                out.bytes(&sealed);
            } else {
                out.fixed_str(&file.name, 25);
            }
        }

        for offset in offsets {
            out.u32(*offset);
        }
        for file in &self.files {
            out.u32(file.data.len() as u32);
        }
        for (index, file) in self.files.iter().enumerate() {
            let archive = self
                .forced_archive
                .iter()
                .find(|(forced, _)| *forced == index)
                .map(|(_, archive)| *archive)
                .unwrap_or(file.archive as u8);
            out.u8(archive);
        }
        Ok(out)
    }

    fn header(&self) -> Writer {
        let mut out = Writer::new();
        out.bytes(CLIB_MAGIC).u8(0x1A).u8(self.version);
        if self.version >= 10 {
            out.u8(0);
        }
        out
    }

    fn finish(&self, body: Writer, volumes: Vec<(String, Vec<u8>)>) -> BuiltArchive {
        if self.prefix.is_empty() {
            return BuiltArchive {
                master: body.into_bytes(),
                volumes,
            };
        }
        let mut out = Writer::new();
        out.bytes(&self.prefix)
            .bytes(body.as_slice())
            .u32(self.prefix.len() as u32)
            .bytes(CLIB_MAGIC)
            .bytes(&TRAILER_CONSTANT)
            .bytes(TRAILER_SIGNATURE);
        BuiltArchive {
            master: out.into_bytes(),
            volumes,
        }
    }
}
