//! Byte-exact bridge between binary payloads and protocol text.
//!
//! Radix-220 digits run up to U+00FE, which is not valid UTF-8 as a
//! single byte. Binary payloads are therefore mapped one byte to one
//! `char` (latin-1), never decoded as UTF-8.

use crate::ProtocolError;

/// Maps every byte to the `char` with the same code point.
pub fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Maps every `char` back to one byte.
///
/// # Errors
/// Returns [`ProtocolError::Unencodable`] for the first character above
/// U+00FF, which has no single-byte form.
pub fn text_to_bytes(text: &str) -> Result<Vec<u8>, ProtocolError> {
    text.chars()
        .enumerate()
        .map(|(offset, ch)| {
            u8::try_from(u32::from(ch))
                .map_err(|_| ProtocolError::Unencodable { ch, offset })
        })
        .collect()
}
