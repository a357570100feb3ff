//! Field-level reading and writing shared by both command tables.
//!
//! A [`Reader`] walks the body of a line (everything after the prefix)
//! one field at a time. Every read is bounded by what is left, so a short
//! line yields short fields instead of an error; the reader remembers that
//! it ran short. A [`Writer`] emits the same fields in the same order and
//! widths.

use crate::radix::{decode95, decode220, encode95, encode220};
use crate::types::PackedId;
use crate::ProtocolError;

pub(crate) type Decode<C> = fn(&mut Reader<'_>) -> Result<C, ProtocolError>;

/// Matches `line` against `table` in order and decodes the body after the
/// first matching prefix. The body must be consumed completely; a field
/// that fails to parse or leftover characters make the line `unknown`.
///
/// The flag is `true` when the body ended before a fixed-width field, a
/// length-prefixed text or a separator was complete.
pub(crate) fn decode_line<C>(
    line: &str,
    table: &[(&str, Decode<C>)],
    unknown: fn(String) -> C,
) -> (C, bool) {
    for &(prefix, decode) in table {
        if let Some(body) = line.strip_prefix(prefix) {
            let mut reader = Reader::new(body);
            let decoded = decode(&mut reader).and_then(|cmd| reader.finish().map(|()| cmd));
            return match decoded {
                Ok(cmd) => (cmd, reader.truncated),
                Err(_) => (unknown(line.to_owned()), false),
            };
        }
    }
    (unknown(line.to_owned()), false)
}

pub(crate) struct Reader<'a> {
    rest: &'a str,
    truncated: bool,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(body: &'a str) -> Self {
        Self {
            rest: body,
            truncated: false,
        }
    }

    /// Takes up to `n` characters.
    pub(crate) fn take(&mut self, n: usize) -> &'a str {
        let (end, complete) = match self.rest.char_indices().nth(n) {
            Some((idx, _)) => (idx, true),
            None => (self.rest.len(), self.rest.chars().count() == n),
        };
        self.truncated |= !complete;
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        head
    }

    /// Takes everything up to the end of the line.
    pub(crate) fn rest(&mut self) -> String {
        std::mem::take(&mut self.rest).to_owned()
    }

    /// Number of characters left.
    pub(crate) fn remaining(&self) -> usize {
        self.rest.chars().count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Fails unless the whole body has been consumed.
    pub(crate) fn finish(&self) -> Result<(), ProtocolError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::TrailingData(self.rest.to_owned()))
        }
    }

    pub(crate) fn r95<T: TryFrom<u64>>(
        &mut self,
        width: usize,
    ) -> Result<T, ProtocolError> {
        narrow(decode95(self.take(width))?)
    }

    pub(crate) fn r220<T: TryFrom<u64>>(
        &mut self,
        width: usize,
    ) -> Result<T, ProtocolError> {
        narrow(decode220(self.take(width))?)
    }

    /// Reads an id split over two one-digit radix-220 slots.
    pub(crate) fn packed(&mut self) -> Result<PackedId, ProtocolError> {
        let low: u32 = self.r220(1)?;
        let high: u32 = self.r220(1)?;
        Ok(PackedId::unpack(low, high))
    }

    /// Reads a one-digit radix-95 length followed by that many chars.
    pub(crate) fn lp(&mut self) -> Result<String, ProtocolError> {
        let len: usize = self.r95(1)?;
        Ok(self.take(len).to_owned())
    }

    /// Reads a canonical decimal up to (and consuming) `stop`, or to the
    /// end of the line when `stop` never appears.
    pub(crate) fn decimal_until<T: TryFrom<u64>>(
        &mut self,
        stop: char,
    ) -> Result<T, ProtocolError> {
        let digits = match self.rest.split_once(stop) {
            Some((digits, tail)) => {
                self.rest = tail;
                digits
            }
            None => {
                self.truncated = true;
                std::mem::take(&mut self.rest)
            }
        };
        narrow(parse_decimal(digits)?)
    }

    /// Reads a canonical decimal running to the end of the line.
    pub(crate) fn decimal<T: TryFrom<u64>>(&mut self) -> Result<T, ProtocolError> {
        narrow(parse_decimal(std::mem::take(&mut self.rest))?)
    }
}

fn narrow<T: TryFrom<u64>>(value: u64) -> Result<T, ProtocolError> {
    T::try_from(value).map_err(|_| ProtocolError::Overflow)
}

/// Parses a decimal that re-encodes to exactly the same text.
fn parse_decimal(s: &str) -> Result<u64, ProtocolError> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if !canonical {
        return Err(ProtocolError::InvalidDecimal(s.to_owned()));
    }
    s.parse().map_err(|_| ProtocolError::Overflow)
}

pub(crate) struct Writer {
    buf: String,
}

impl Writer {
    pub(crate) fn new(prefix: &str) -> Self {
        Self {
            buf: prefix.to_owned(),
        }
    }

    pub(crate) fn r95(mut self, value: impl Into<u64>, width: usize) -> Self {
        self.buf.push_str(&encode95(value.into(), width));
        self
    }

    pub(crate) fn r220(mut self, value: impl Into<u64>, width: usize) -> Self {
        self.buf.push_str(&encode220(value.into(), width));
        self
    }

    pub(crate) fn packed(self, id: PackedId) -> Self {
        let (low, high) = id.pack();
        self.r220(low, 1).r220(high, 1)
    }

    pub(crate) fn lp(mut self, text: &str) -> Self {
        let len = text.chars().count();
        debug_assert!(len < 95, "length-prefixed text is limited to 94 chars");
        self.buf.push_str(&encode95(len as u64, 1));
        self.buf.push_str(text);
        self
    }

    pub(crate) fn text(mut self, text: &str) -> Self {
        self.buf.push_str(text);
        self
    }

    pub(crate) fn decimal(mut self, value: impl Into<u64>) -> Self {
        self.buf.push_str(&value.into().to_string());
        self
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}
