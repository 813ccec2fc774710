//! Call-number encoding.
//!
//! Call numbers are encoded as base-43 integers over a fixed, ASCII-ordered alphabet so
//! that numeric range comparisons follow shelf order of the first eleven symbols.

use std::iter;

/// Encoding alphabet in ascending ASCII order. The space pads short values.
const ALPHABET: &[u8; 43] = b" #$+./0123456789:ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of leading symbols that contribute to the encoded value.
const WIDTH: usize = 11;

/// Encodes a call number as a long in `[0, 43^11)`.
///
/// Input is uppercased and characters outside the alphabet are dropped. Only the first
/// eleven remaining symbols count; shorter values are padded with spaces.
pub fn encode_call_number(value: &str) -> i64 {
    let base = ALPHABET.len() as i64;
    let digits = value
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter_map(symbol_index)
        .chain(iter::repeat(0))
        .take(WIDTH);

    digits.fold(0_i64, |acc, digit| acc * base + digit)
}

/// Position of a character in the alphabet.
fn symbol_index(c: char) -> Option<i64> {
    let byte = u8::try_from(c).ok()?;
    ALPHABET
        .iter()
        .position(|&symbol| symbol == byte)
        .and_then(|index| i64::try_from(index).ok())
}
