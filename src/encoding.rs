//! Deterministic big-endian encoding helpers (primitives and fixed-width text).
//!
//! All multi-byte values are big-endian and text is stored as UTF-16 code
//! units, which keeps the layout byte-compatible with existing `wines.dat`
//! files.

use crate::config::PAD_UNIT;
use crate::error::{WineError, WineResult};

/// Write an i32 big-endian.
pub fn write_i32_be(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Write an f64 big-endian (IEEE-754 bit pattern).
pub fn write_f64_be(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_bits().to_be_bytes());
}

/// Read i32 big-endian.
pub fn read_i32_be(input: &[u8], pos: &mut usize) -> WineResult<i32> {
    let buf = take::<4>(input, pos, "i32")?;
    Ok(i32::from_be_bytes(buf))
}

/// Read f64 big-endian.
pub fn read_f64_be(input: &[u8], pos: &mut usize) -> WineResult<f64> {
    let buf = take::<8>(input, pos, "f64")?;
    Ok(f64::from_bits(u64::from_be_bytes(buf)))
}

fn take<const N: usize>(input: &[u8], pos: &mut usize, what: &str) -> WineResult<[u8; N]> {
    if *pos + N > input.len() {
        return Err(WineError::corruption(
            "encoding.fixed.eof",
            format!("not enough bytes for {}", what),
        ));
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(&input[*pos..*pos + N]);
    *pos += N;
    Ok(buf)
}

/// Number of UTF-16 code units needed to store `s`.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Write `s` as exactly `units` UTF-16 code units, space-padded on the right.
///
/// Text longer than the field is cut at the last whole character that fits,
/// so a surrogate pair is never split. Returns true if anything was dropped.
pub fn write_fixed_utf16(out: &mut Vec<u8>, s: &str, units: usize) -> bool {
    let mut used = 0;
    let mut truncated = false;
    let mut pair = [0u16; 2];
    for ch in s.chars() {
        let encoded = ch.encode_utf16(&mut pair);
        if used + encoded.len() > units {
            truncated = true;
            break;
        }
        for unit in encoded.iter() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        used += encoded.len();
    }
    for _ in used..units {
        out.extend_from_slice(&PAD_UNIT.to_be_bytes());
    }
    truncated
}

/// Read a field of `units` UTF-16 code units and strip trailing padding.
///
/// Older writers cut fields at a fixed unit count, which can leave the first
/// half of a surrogate pair at the end of the field; that unit is dropped.
/// Any other unpaired surrogate decodes as U+FFFD.
pub fn read_fixed_utf16(input: &[u8], pos: &mut usize, units: usize) -> WineResult<String> {
    let byte_len = units * 2;
    if *pos + byte_len > input.len() {
        return Err(WineError::corruption(
            "encoding.text.eof",
            "not enough bytes for text field",
        ));
    }
    let mut raw: Vec<u16> = input[*pos..*pos + byte_len]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    *pos += byte_len;
    while raw.last().is_some_and(|&u| u == PAD_UNIT || u == 0) {
        raw.pop();
    }
    if raw.last().is_some_and(|&u| is_high_surrogate(u)) {
        raw.pop();
    }
    Ok(String::from_utf16_lossy(&raw))
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}
