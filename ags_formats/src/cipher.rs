//! The two casual obfuscation schemes used by the data files.
//!
//! Both are rolling subtract ciphers over a fixed 11-byte key. Decryption
//! stops at the first byte that decrypts to zero; a buffer without such a
//! terminator is rejected instead of being read past its declared length.

/// Key applied to file names in v11+ archive indexes.
pub const ARCHIVE_NAME_KEY: &[u8; 11] = b"My\x01\xde\x04Jibzle";

/// Key applied to in-game text: global messages, dictionary words, dialog
/// sources and legacy speech lines.
pub const GAME_TEXT_KEY: &[u8; 11] = b"Avis Durgan";

/// Decrypt `data` with `key`, returning the plaintext without its terminator,
/// or `None` when no byte decrypts to zero within `data`.
pub fn decrypt(key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    for (byte, k) in data.iter().zip(key.iter().cycle()) {
        let plain = byte.wrapping_sub(*k);
        if plain == 0 {
            return Some(out);
        }
        out.push(plain);
    }
    None
}

/// Inverse of [`decrypt`]. The output includes the encrypted terminator, so
/// it is exactly `plain.len() + 1` bytes long.
pub fn encrypt(key: &[u8], plain: &[u8]) -> Vec<u8> {
    plain
        .iter()
        .chain(std::iter::once(&0u8))
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte.wrapping_add(*k))
        .collect()
}

/// v6 archives shift every name byte by a single modifier. The terminator is
/// stored unshifted.
pub fn decode_shifted(data: &[u8], modifier: u8) -> Option<Vec<u8>> {
    let end = data.iter().position(|&b| b == 0)?;
    Some(data[..end].iter().map(|b| b.wrapping_sub(modifier)).collect())
}

pub fn encode_shifted(plain: &[u8], modifier: u8) -> Vec<u8> {
    let mut out: Vec<u8> = plain.iter().map(|b| b.wrapping_add(modifier)).collect();
    out.push(0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_text_round_trips_with_declared_length() {
        let sealed = encrypt(GAME_TEXT_KEY, b"You can't pick that up.");
        assert_eq!(sealed.len(), 24);
        let opened = decrypt(GAME_TEXT_KEY, &sealed).unwrap();
        assert_eq!(opened, b"You can't pick that up.");
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let sealed = encrypt(GAME_TEXT_KEY, b"hello");
        assert!(decrypt(GAME_TEXT_KEY, &sealed[..sealed.len() - 1]).is_none());
    }

    #[test]
    fn key_cycles_after_eleven_bytes() {
        let plain = b"0123456789abcdefghij";
        let sealed = encrypt(ARCHIVE_NAME_KEY, plain);
        assert_eq!(sealed[11], plain[11].wrapping_add(ARCHIVE_NAME_KEY[0]));
        assert_eq!(decrypt(ARCHIVE_NAME_KEY, &sealed).unwrap(), plain);
    }

    #[test]
    fn trailing_bytes_after_terminator_are_ignored() {
        let mut sealed = encrypt(ARCHIVE_NAME_KEY, b"room1.crm");
        sealed.extend_from_slice(&[0xAA; 6]);
        assert_eq!(decrypt(ARCHIVE_NAME_KEY, &sealed).unwrap(), b"room1.crm");
    }

    #[test]
    fn shifted_names_stop_at_raw_zero() {
        let mut stored = encode_shifted(b"intro.wav", 0x20);
        stored.resize(13, 0);
        assert_eq!(decode_shifted(&stored, 0x20).unwrap(), b"intro.wav");
        assert!(decode_shifted(&[0x41, 0x42], 1).is_none());
    }
}
