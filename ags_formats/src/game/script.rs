use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

pub const SCRIPT_MAGIC: &[u8; 4] = b"SCOM";
pub const SCRIPT_END_MARKER: u32 = 0xBEEF_CAFE;
pub const NEWEST_SCRIPT_VERSION: i32 = 90;
const SECTIONS_SINCE: i32 = 83;
const SYMBOL_MAX_LEN: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptExport {
    pub name: String,
    pub address: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptSection {
    pub name: String,
    pub offset: i32,
}

/// Compiled script unit. Bytecode is kept opaque; the interpreter is not
/// part of this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledScript {
    pub version: i32,
    #[serde(skip)]
    pub global_data: Vec<u8>,
    #[serde(skip)]
    pub code: Vec<i32>,
    #[serde(skip)]
    pub strings: Vec<u8>,
    #[serde(skip)]
    pub fixup_types: Vec<u8>,
    #[serde(skip)]
    pub fixups: Vec<i32>,
    pub imports: Vec<String>,
    pub exports: Vec<ScriptExport>,
    pub sections: Vec<ScriptSection>,
}

impl Default for CompiledScript {
    fn default() -> Self {
        Self {
            version: NEWEST_SCRIPT_VERSION,
            global_data: Vec::new(),
            code: Vec::new(),
            strings: Vec::new(),
            fixup_types: Vec::new(),
            fixups: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            sections: Vec::new(),
        }
    }
}

impl CompiledScript {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let start = cursor.position();
        if cursor.read_bytes(4)? != SCRIPT_MAGIC {
            return Err(Error::BadMagic {
                expected: "SCOM",
                offset: start as u64,
            });
        }
        let version = cursor.read_i32()?;
        if !(0..=NEWEST_SCRIPT_VERSION).contains(&version) {
            return Err(Error::UnsupportedVersion {
                format: "compiled script",
                version: version as u32,
            });
        }
        let data_size = cursor.read_count()?;
        let code_size = cursor.read_count()?;
        let strings_size = cursor.read_count()?;
        let global_data = cursor.read_bytes(data_size)?.to_vec();
        let code = cursor.read_i32_vec(code_size)?;
        let strings = cursor.read_bytes(strings_size)?.to_vec();

        let fixup_count = cursor.read_count()?;
        cursor.expect_records(fixup_count, 5)?;
        let fixup_types = cursor.read_bytes(fixup_count)?.to_vec();
        let fixups = cursor.read_i32_vec(fixup_count)?;

        let import_count = cursor.read_count()?;
        cursor.expect_records(import_count, 1)?;
        let imports = (0..import_count)
            .map(|_| cursor.read_c_string(SYMBOL_MAX_LEN))
            .collect::<Result<_>>()?;

        let export_count = cursor.read_count()?;
        cursor.expect_records(export_count, 5)?;
        let exports = (0..export_count)
            .map(|_| {
                Ok(ScriptExport {
                    name: cursor.read_c_string(SYMBOL_MAX_LEN)?,
                    address: cursor.read_i32()?,
                })
            })
            .collect::<Result<_>>()?;

        let sections = if version >= SECTIONS_SINCE {
            let section_count = cursor.read_count()?;
            cursor.expect_records(section_count, 5)?;
            (0..section_count)
                .map(|_| {
                    Ok(ScriptSection {
                        name: cursor.read_c_string(SYMBOL_MAX_LEN)?,
                        offset: cursor.read_i32()?,
                    })
                })
                .collect::<Result<_>>()?
        } else {
            Vec::new()
        };

        let end = cursor.position();
        if cursor.read_u32()? != SCRIPT_END_MARKER {
            return Err(Error::BadMagic {
                expected: "script end marker",
                offset: end as u64,
            });
        }

        Ok(Self {
            version,
            global_data,
            code,
            strings,
            fixup_types,
            fixups,
            imports,
            exports,
            sections,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.bytes(SCRIPT_MAGIC)
            .i32(self.version)
            .i32(self.global_data.len() as i32)
            .i32(self.code.len() as i32)
            .i32(self.strings.len() as i32)
            .bytes(&self.global_data);
        for word in &self.code {
            out.i32(*word);
        }
        out.bytes(&self.strings).i32(self.fixups.len() as i32);
        out.bytes(&self.fixup_types);
        for fixup in &self.fixups {
            out.i32(*fixup);
        }
        out.i32(self.imports.len() as i32);
        for import in &self.imports {
            out.c_str(import);
        }
        out.i32(self.exports.len() as i32);
        for export in &self.exports {
            out.c_str(&export.name).i32(export.address);
        }
        if self.version >= SECTIONS_SINCE {
            out.i32(self.sections.len() as i32);
            for section in &self.sections {
                out.c_str(&section.name).i32(section.offset);
            }
        }
        out.u32(SCRIPT_END_MARKER);
    }

    pub fn export(&self, name: &str) -> Option<&ScriptExport> {
        self.exports.iter().find(|export| export.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompiledScript {
        CompiledScript {
            global_data: vec![0; 8],
            code: vec![1, 2, 3, 4],
            strings: b"hello\0".to_vec(),
            fixup_types: vec![1],
            fixups: vec![2],
            imports: vec!["Display".into(), "Character::Say^1".into()],
            exports: vec![ScriptExport {
                name: "game_start".into(),
                address: 0,
            }],
            sections: vec![ScriptSection {
                name: "GlobalScript.asc".into(),
                offset: 0,
            }],
            ..CompiledScript::default()
        }
    }

    #[test]
    fn script_units_decode_symbols() {
        let script = sample();
        let mut out = Writer::new();
        script.write(&mut out);
        let mut cursor = Cursor::new(out.as_slice());
        let decoded = CompiledScript::read(&mut cursor).unwrap();
        assert_eq!(decoded, script);
        assert!(decoded.export("game_start").is_some());
        assert!(cursor.is_empty());
    }

    #[test]
    fn missing_end_marker_is_reported() {
        let mut out = Writer::new();
        sample().write(&mut out);
        let mut bytes = out.into_bytes();
        let len = bytes.len();
        bytes[len - 1] = 0;
        let err = CompiledScript::read(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            Error::BadMagic {
                expected: "script end marker",
                ..
            }
        ));
    }

    #[test]
    fn old_units_have_no_sections() {
        let script = CompiledScript {
            version: 82,
            sections: Vec::new(),
            ..sample()
        };
        let mut out = Writer::new();
        script.write(&mut out);
        let decoded = CompiledScript::read(&mut Cursor::new(out.as_slice())).unwrap();
        assert!(decoded.sections.is_empty());
    }
}
