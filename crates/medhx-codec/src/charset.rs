//! Single-byte character set of the flat files.
//!
//! Files are ISO-8859-1: every byte maps to the code point of the same value, so
//! decoding never fails. Characters above U+00FF cannot be represented and are
//! written as `?`.

/// Replacement byte for characters outside the character set.
pub const REPLACEMENT: u8 = b'?';

/// Decode ISO-8859-1 bytes.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as ISO-8859-1.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(REPLACEMENT))
        .collect()
}

/// Whether every character of `text` survives [`encode`] unchanged.
pub fn is_representable(text: &str) -> bool {
    text.chars().all(|ch| u32::from(ch) <= 0xFF)
}
