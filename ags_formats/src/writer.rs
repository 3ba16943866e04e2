use byteorder::{ByteOrder, LittleEndian};

use crate::cipher;

/// Little-endian byte buffer builder, the write-side counterpart of
/// [`crate::reader::Cursor`]. Used to author fixtures and by packing tools.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Text padded (or cut) to a fixed width. The last byte is always zero.
    pub fn fixed_str(&mut self, text: &str, width: usize) -> &mut Self {
        let mut field = vec![0u8; width];
        let len = text.len().min(width.saturating_sub(1));
        field[..len].copy_from_slice(&text.as_bytes()[..len]);
        self.bytes(&field)
    }

    pub fn c_str(&mut self, text: &str) -> &mut Self {
        self.bytes(text.as_bytes()).u8(0)
    }

    /// i32 length (including terminator) then the text and a zero byte.
    pub fn prefixed_str(&mut self, text: &str) -> &mut Self {
        self.i32(text.len() as i32 + 1).c_str(text)
    }

    /// i32 length then text sealed with the in-game key.
    pub fn encrypted_str(&mut self, text: &str) -> &mut Self {
        let sealed = cipher::encrypt(cipher::GAME_TEXT_KEY, text.as_bytes());
        self.i32(sealed.len() as i32).bytes(&sealed)
    }

    pub fn patch_u32(&mut self, pos: usize, v: u32) {
        LittleEndian::write_u32(&mut self.buf[pos..pos + 4], v);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
