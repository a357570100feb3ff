//! Error types for the protocol layer.
//!
//! The line codec itself is total: it never hands these errors to its
//! callers. They are raised while a single field is being parsed, and the
//! codec answers them by classifying the whole line as `Unknown`. The
//! Base-N and latin-1 helpers are public and return them directly.

/// Errors that can occur in the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A numeral contained a character outside its alphabet.
    #[error("invalid radix-{radix} digit {ch:?}")]
    InvalidDigit { ch: char, radix: u32 },

    /// A numeral does not fit in the target integer type.
    #[error("numeric field overflows its integer type")]
    Overflow,

    /// A decimal field was empty, signed, or had leading zeros.
    #[error("invalid decimal field {0:?}")]
    InvalidDecimal(String),

    /// A command without fields was followed by more text.
    #[error("unexpected trailing data {0:?}")]
    TrailingData(String),

    /// Text cannot be mapped one-to-one onto bytes.
    #[error("character {ch:?} at offset {offset} does not fit in one byte")]
    Unencodable { ch: char, offset: usize },
}
