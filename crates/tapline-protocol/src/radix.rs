//! The two fixed-alphabet numeral systems used by the wire protocol.
//!
//! - **Radix-95** is big-endian. Digit `d` is the character `d + 32`, so
//!   every digit is printable ASCII (space is zero, `~` is 94).
//! - **Radix-220** is little-endian. Digit `d` is the character `d + 35`
//!   (`#` is zero, U+00FE is 219). Digits beyond U+007F are only safe on
//!   the wire because text is carried as raw latin-1 code units.
//!
//! Both encoders take a minimum length. Radix-95 pads on the left and
//! radix-220 pads on the right, each with its zero digit. A value that
//! needs more digits than the minimum gets them: nothing is truncated.

use crate::ProtocolError;

const BASE95: u64 = 95;
const ZERO95: u8 = 32;
const BASE220: u64 = 220;
const ZERO220: u8 = 35;

/// Encodes `value` in radix-95, left-padded to at least `min_len` digits.
///
/// ```
/// use tapline_protocol::radix::encode95;
///
/// assert_eq!(encode95(0, 0), " ");
/// assert_eq!(encode95(95, 0), "! ");
/// assert_eq!(encode95(1, 3), "  !");
/// ```
pub fn encode95(value: u64, min_len: usize) -> String {
    let mut digits = Vec::with_capacity(min_len.max(1));
    let mut rest = value;
    loop {
        digits.push(digit_char(rest % BASE95, ZERO95));
        rest /= BASE95;
        if rest == 0 {
            break;
        }
    }
    while digits.len() < min_len {
        digits.push(char::from(ZERO95));
    }
    digits.iter().rev().collect()
}

/// Decodes a big-endian radix-95 numeral. The empty string is zero.
pub fn decode95(s: &str) -> Result<u64, ProtocolError> {
    s.chars().try_fold(0u64, |acc, ch| {
        let digit = digit_value(ch, ZERO95, BASE95, 95)?;
        acc.checked_mul(BASE95)
            .and_then(|v| v.checked_add(digit))
            .ok_or(ProtocolError::Overflow)
    })
}

/// Encodes `value` in radix-220, right-padded to at least `min_len` digits.
///
/// ```
/// use tapline_protocol::radix::encode220;
///
/// assert_eq!(encode220(0, 0), "#");
/// assert_eq!(encode220(220, 0), "#$");
/// assert_eq!(encode220(1, 3), "$##");
/// ```
pub fn encode220(value: u64, min_len: usize) -> String {
    let mut out = String::with_capacity(min_len.max(1) * 2);
    let mut rest = value;
    let mut len = 0;
    loop {
        out.push(digit_char(rest % BASE220, ZERO220));
        len += 1;
        rest /= BASE220;
        if rest == 0 {
            break;
        }
    }
    while len < min_len {
        out.push(char::from(ZERO220));
        len += 1;
    }
    out
}

/// Decodes a little-endian radix-220 numeral. The empty string is zero.
pub fn decode220(s: &str) -> Result<u64, ProtocolError> {
    s.chars().rev().try_fold(0u64, |acc, ch| {
        let digit = digit_value(ch, ZERO220, BASE220, 220)?;
        acc.checked_mul(BASE220)
            .and_then(|v| v.checked_add(digit))
            .ok_or(ProtocolError::Overflow)
    })
}

fn digit_char(digit: u64, zero: u8) -> char {
    // digit < base and zero + base - 1 <= 0xFE, so this stays in one byte.
    char::from(zero + digit as u8)
}

fn digit_value(
    ch: char,
    zero: u8,
    base: u64,
    radix: u32,
) -> Result<u64, ProtocolError> {
    let code = u64::from(u32::from(ch));
    match code.checked_sub(u64::from(zero)) {
        Some(digit) if digit < base => Ok(digit),
        _ => Err(ProtocolError::InvalidDigit { ch, radix }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural_len95(mut v: u64) -> usize {
        let mut n = 1;
        while v >= BASE95 {
            v /= BASE95;
            n += 1;
        }
        n
    }

    #[test]
    fn test_radix95_known_values() {
        assert_eq!(encode95(0, 0), " ");
        assert_eq!(encode95(94, 0), "~");
        assert_eq!(encode95(95, 0), "! ");
        assert_eq!(encode95(95 * 95, 0), "!  ");
    }

    #[test]
    fn test_radix95_pads_left_with_space() {
        assert_eq!(encode95(1, 4), "   !");
        assert_eq!(decode95("   !"), Ok(1));
    }

    #[test]
    fn test_radix95_never_truncates() {
        // 95 needs two digits; a minimum of one must not cut it.
        assert_eq!(encode95(95, 1), "! ");
    }

    #[test]
    fn test_radix220_known_values() {
        assert_eq!(encode220(0, 0), "#");
        assert_eq!(encode220(219, 0), "\u{fe}");
        assert_eq!(encode220(220, 0), "#$");
    }

    #[test]
    fn test_radix220_pads_right_with_hash() {
        assert_eq!(encode220(5, 3), "(##");
        assert_eq!(decode220("(##"), Ok(5));
    }

    #[test]
    fn test_round_trips_at_2_pow_53() {
        let v = 1u64 << 53;
        assert_eq!(decode95(&encode95(v, 0)), Ok(v));
        assert_eq!(decode220(&encode220(v, 0)), Ok(v));
        assert_eq!(decode95(&encode95(u64::MAX, 0)), Ok(u64::MAX));
        assert_eq!(decode220(&encode220(u64::MAX, 0)), Ok(u64::MAX));
    }

    #[test]
    fn test_empty_decodes_to_zero() {
        assert_eq!(decode95(""), Ok(0));
        assert_eq!(decode220(""), Ok(0));
    }

    #[test]
    fn test_rejects_out_of_alphabet() {
        assert_eq!(
            decode95("\u{7f}"),
            Err(ProtocolError::InvalidDigit { ch: '\u{7f}', radix: 95 })
        );
        assert_eq!(
            decode220(" "),
            Err(ProtocolError::InvalidDigit { ch: ' ', radix: 220 })
        );
        assert!(decode220("\u{ff}").is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(decode95(&"~".repeat(20)), Err(ProtocolError::Overflow));
    }

    #[test]
    fn test_length_matches_max_of_min_and_natural() {
        for (v, len) in [(0u64, 0usize), (94, 2), (95, 1), (9024, 2), (9025, 2)] {
            assert_eq!(
                encode95(v, len).chars().count(),
                len.max(natural_len95(v))
            );
        }
    }

    mod laws {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn radix95_round_trips(v in 0u64..=(1u64 << 53), len in 0usize..12) {
                let s = encode95(v, len);
                prop_assert_eq!(decode95(&s), Ok(v));
                prop_assert!(s.chars().count() >= len.max(1));
            }

            #[test]
            fn radix220_round_trips(v in 0u64..=(1u64 << 53), len in 0usize..12) {
                let s = encode220(v, len);
                prop_assert_eq!(decode220(&s), Ok(v));
                prop_assert!(s.chars().count() >= len.max(1));
            }

            #[test]
            fn padding_only_adds_zero_digits(v in 0u64..1_000_000, len in 0usize..12) {
                let natural95 = encode95(v, 0);
                let padded95 = encode95(v, len);
                prop_assert!(padded95.ends_with(&natural95));
                prop_assert!(padded95.trim_start_matches(' ').len()
                    <= natural95.len());

                let natural220 = encode220(v, 0);
                let padded220 = encode220(v, len);
                prop_assert!(padded220.starts_with(&natural220));
                prop_assert_eq!(
                    padded220.chars().count(),
                    len.max(natural220.chars().count())
                );
            }
        }
    }
}
