use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

pub const DIALOG_SIZE: usize = 4696;
pub const MAX_DIALOG_OPTIONS: usize = 30;
const OPTION_TEXT_LEN: usize = 150;

pub mod offsets {
    pub const OPTION_NAMES: u32 = 0;
    pub const OPTION_FLAGS: u32 = 4500;
    pub const OPTION_SCRIPTS: u32 = 4620;
    pub const ENTRY_POINTS: u32 = 4624;
    pub const STARTUP_ENTRY_POINT: u32 = 4684;
    pub const CODE_SIZE: u32 = 4686;
    pub const OPTION_COUNT: u32 = 4688;
    pub const TOPIC_FLAGS: u32 = 4692;
}

pub const OPTION_ON: i32 = 1;
pub const OPTION_OFF_FOR_GOOD: i32 = 2;
pub const OPTION_NO_REPEAT: i32 = 4;
pub const OPTION_CHOSEN: i32 = 8;
pub const TOPIC_SHOW_PARSER: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogOption {
    pub text: String,
    pub flags: i32,
    pub entry_point: i16,
}

/// Bytecode and source text stored inline by games up to 3.1.0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegacyDialogCode {
    #[serde(skip)]
    pub code: Vec<u8>,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogTopic {
    pub options: Vec<DialogOption>,
    pub startup_entry_point: i16,
    pub code_size: i16,
    pub topic_flags: i32,
    pub legacy: Option<LegacyDialogCode>,
}

impl DialogTopic {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let mut texts = Vec::with_capacity(MAX_DIALOG_OPTIONS);
        for _ in 0..MAX_DIALOG_OPTIONS {
            texts.push(cursor.read_fixed_string(OPTION_TEXT_LEN)?);
        }
        let flags = cursor.read_i32_vec(MAX_DIALOG_OPTIONS)?;
        let _scripts_pointer = cursor.read_i32()?;
        let entry_points = cursor.read_i16_vec(MAX_DIALOG_OPTIONS)?;
        let startup_entry_point = cursor.read_i16()?;
        let code_size = cursor.read_i16()?;
        let option_count = cursor.read_count()?;
        let topic_flags = cursor.read_i32()?;
        if option_count > MAX_DIALOG_OPTIONS {
            return Err(Error::InvalidCount {
                section: cursor.section(),
                count: option_count as i64,
            });
        }

        let options = texts
            .into_iter()
            .zip(flags)
            .zip(entry_points)
            .take(option_count)
            .map(|((text, flags), entry_point)| DialogOption {
                text,
                flags,
                entry_point,
            })
            .collect();
        Ok(Self {
            options,
            startup_entry_point,
            code_size,
            topic_flags,
            legacy: None,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        let blank = DialogOption::default();
        let option = |index: usize| self.options.get(index).unwrap_or(&blank);
        for index in 0..MAX_DIALOG_OPTIONS {
            out.fixed_str(&option(index).text, OPTION_TEXT_LEN);
        }
        for index in 0..MAX_DIALOG_OPTIONS {
            out.i32(option(index).flags);
        }
        out.i32(0);
        for index in 0..MAX_DIALOG_OPTIONS {
            out.i16(option(index).entry_point);
        }
        let code_size = match &self.legacy {
            Some(legacy) => legacy.code.len() as i16,
            None => self.code_size,
        };
        out.i16(self.startup_entry_point)
            .i16(code_size)
            .i32(self.options.len().min(MAX_DIALOG_OPTIONS) as i32)
            .i32(self.topic_flags);
    }

    pub(crate) fn read_legacy_code(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
        let size = usize::try_from(self.code_size).map_err(|_| Error::InvalidCount {
            section: cursor.section(),
            count: self.code_size as i64,
        })?;
        let code = cursor.read_bytes(size)?.to_vec();
        let source = cursor.read_encrypted_string()?;
        self.legacy = Some(LegacyDialogCode { code, source });
        Ok(())
    }

    pub(crate) fn write_legacy_code(&self, out: &mut Writer) {
        match &self.legacy {
            Some(legacy) => {
                out.bytes(&legacy.code).encrypted_str(&legacy.source);
            }
            None => {
                out.zeros(self.code_size.max(0) as usize).encrypted_str("");
            }
        }
    }

    pub fn option_enabled(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| option.flags & OPTION_ON != 0)
    }
}

/// Encrypted speech lines that legacy games append after the dialog code.
/// The list has no count; it ends where the GUI section's magic begins.
pub(crate) fn read_speech_lines(cursor: &mut Cursor<'_>, stop_marker: u32) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        match cursor.peek_u32() {
            Some(marker) if marker == stop_marker => return Ok(lines),
            Some(_) => lines.push(cursor.read_encrypted_string()?),
            None => {
                return Err(Error::Truncated {
                    section: cursor.section(),
                    offset: cursor.position(),
                    needed: 4,
                    available: cursor.remaining(),
                });
            }
        }
    }
}

pub(crate) fn write_speech_lines(lines: &[String], out: &mut Writer) {
    for line in lines {
        out.encrypted_str(line);
    }
}
