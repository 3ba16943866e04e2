use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::WINDOWS_1252;

use crate::cipher;
use crate::error::{Error, Result};

/// Little-endian read cursor over a byte slice.
///
/// The cursor remembers which section of the stream it is decoding so every
/// bounds failure names the section that ran out of data.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    section: &'static str,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            section: "stream",
        }
    }

    /// Label subsequent reads with `section` for error reporting.
    pub fn enter(&mut self, section: &'static str) {
        self.section = section;
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_bool32(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Look at the next little-endian u32 without consuming it.
    pub fn peek_u32(&self) -> Option<u32> {
        self.data
            .get(self.pos..self.pos + 4)
            .map(LittleEndian::read_u32)
    }

    pub fn read_i16_vec(&mut self, count: usize) -> Result<Vec<i16>> {
        self.expect_records(count, 2)?;
        (0..count).map(|_| self.read_i16()).collect()
    }

    pub fn read_i32_vec(&mut self, count: usize) -> Result<Vec<i32>> {
        self.expect_records(count, 4)?;
        (0..count).map(|_| self.read_i32()).collect()
    }

    /// Read an element count stored as i32 and reject negative values.
    pub fn read_count(&mut self) -> Result<usize> {
        let raw = self.read_i32()?;
        usize::try_from(raw).map_err(|_| Error::InvalidCount {
            section: self.section,
            count: raw as i64,
        })
    }

    /// Verify that `count` records of at least `record_size` bytes fit in the
    /// remaining stream before any of them is decoded.
    pub fn expect_records(&self, count: usize, record_size: usize) -> Result<()> {
        let needed = count.saturating_mul(record_size);
        if needed > self.remaining() {
            return Err(Error::SectionOverrun {
                section: self.section,
                offset: self.pos,
                count,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Fixed-width text field, cut at the first zero byte.
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let bytes = self.read_bytes(width)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(width);
        Ok(decode_text(&bytes[..end]))
    }

    /// Zero-terminated string of at most `max_len` bytes including the
    /// terminator.
    pub fn read_c_string(&mut self, max_len: usize) -> Result<String> {
        let offset = self.pos;
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let window = &rest[..rest.len().min(max_len)];
        match window.iter().position(|&b| b == 0) {
            Some(end) => {
                let text = decode_text(&window[..end]);
                self.pos += end + 1;
                Ok(text)
            }
            None if window.len() < max_len => Err(Error::Truncated {
                section: self.section,
                offset,
                needed: window.len() + 1,
                available: window.len(),
            }),
            None => Err(Error::UnterminatedString {
                section: self.section,
                offset,
                max_len,
            }),
        }
    }

    /// i32 length followed by that many bytes of text.
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_count()?;
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
        Ok(decode_text(&bytes[..end]))
    }

    /// i32 length followed by text sealed with the in-game key.
    pub fn read_encrypted_string(&mut self) -> Result<String> {
        let len = self.read_count()?;
        self.read_encrypted_bytes(len)
    }

    pub fn read_encrypted_bytes(&mut self, len: usize) -> Result<String> {
        let offset = self.pos;
        let sealed = self.read_bytes(len)?;
        let plain = cipher::decrypt(cipher::GAME_TEXT_KEY, sealed).ok_or(
            Error::UnterminatedString {
                section: self.section,
                offset,
                max_len: len,
            },
        )?;
        Ok(decode_text(&plain))
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(Error::Truncated {
                section: self.section,
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Game text is stored in the Windows-1252 code page.
pub fn decode_text(bytes: &[u8]) -> String {
    WINDOWS_1252
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_little_endian() {
        let data = [0x34, 0x12, 0xfe, 0xff, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.peek_u32(), Some(0x1234_5678));
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_i32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.peek_u32(), None);
    }

    #[test]
    fn truncation_names_the_section() {
        let data = [1u8, 0, 0];
        let mut cursor = Cursor::new(&data);
        cursor.enter("palette");
        let err = cursor.read_i32().unwrap_err();
        match err {
            Error::Truncated {
                section,
                needed,
                available,
                ..
            } => {
                assert_eq!(section, "palette");
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn record_counts_are_checked_before_reading() {
        let data = [0u8; 10];
        let mut cursor = Cursor::new(&data);
        cursor.enter("characters");
        let err = cursor.expect_records(2, 780).unwrap_err();
        assert!(matches!(
            err,
            Error::SectionOverrun {
                section: "characters",
                needed: 1560,
                available: 10,
                ..
            }
        ));
    }

    #[test]
    fn c_strings_respect_their_limit() {
        let data = b"abc\0defghij";
        let mut cursor = Cursor::new(data);
        assert_eq!(cursor.read_c_string(50).unwrap(), "abc");
        assert_eq!(cursor.position(), 4);
        let err = cursor.read_c_string(4).unwrap_err();
        assert!(matches!(err, Error::UnterminatedString { max_len: 4, .. }));
    }

    #[test]
    fn encrypted_string_with_short_length_fails() {
        let sealed = cipher::encrypt(cipher::GAME_TEXT_KEY, b"Hello");
        let mut data = Vec::new();
        data.extend_from_slice(&((sealed.len() - 1) as i32).to_le_bytes());
        data.extend_from_slice(&sealed);
        let mut cursor = Cursor::new(&data);
        let err = cursor.read_encrypted_string().unwrap_err();
        assert!(matches!(err, Error::UnterminatedString { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }
}
