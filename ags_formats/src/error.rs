use std::io;

use thiserror::Error;

/// Broad classification used by callers that need to tell "unsupported" from
/// "corrupt" from "truncated" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Bounds,
    Unimplemented,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("missing {expected} signature at offset {offset:#x}")]
    BadMagic { expected: &'static str, offset: u64 },

    #[error("executable trailer does not carry a CLIB end signature")]
    BadTrailer,

    #[error("unsupported {format} version {version}")]
    UnsupportedVersion { format: &'static str, version: u32 },

    #[error("archive is volume {position} of a chain; only the first volume can be opened")]
    NotFirstInChain { position: u8 },

    #[error("{feature} is not implemented")]
    Unimplemented { feature: &'static str },

    #[error("{section}: unexpected end of data at offset {offset:#x} (need {needed} bytes, have {available})")]
    Truncated {
        section: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error(
        "{section}: {count} records need {needed} bytes at offset {offset:#x} but only {available} remain"
    )]
    SectionOverrun {
        section: &'static str,
        offset: usize,
        count: usize,
        needed: usize,
        available: usize,
    },

    #[error("{section}: invalid element count {count}")]
    InvalidCount { section: &'static str, count: i64 },

    #[error("{section}: string at offset {offset:#x} is not terminated within {max_len} bytes")]
    UnterminatedString {
        section: &'static str,
        offset: usize,
        max_len: usize,
    },

    #[error("entry {name} refers to archive {archive} but only {archive_count} archives are declared")]
    InvalidArchiveIndex {
        name: String,
        archive: usize,
        archive_count: usize,
    },

    #[error("entry {name} ({offset:#x}+{size}) lies outside {archive} ({len} bytes)")]
    EntryOutOfRange {
        name: String,
        archive: String,
        offset: u64,
        size: u64,
        len: u64,
    },

    #[error("{section}: {control} declares {count} event handlers, limit is {limit}")]
    TooManyEvents {
        section: &'static str,
        control: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("{archive} holds no game data file")]
    MissingGameData { archive: String },

    #[error("{section}: {message}")]
    Corrupt {
        section: &'static str,
        message: String,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::Truncated { .. }
            | Error::SectionOverrun { .. }
            | Error::InvalidArchiveIndex { .. }
            | Error::EntryOutOfRange { .. } => ErrorKind::Bounds,
            Error::Unimplemented { .. } => ErrorKind::Unimplemented,
            _ => ErrorKind::Format,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn corrupt(section: &'static str, message: impl Into<String>) -> Self {
        Error::Corrupt {
            section,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
