//! Fixed-width 4-byte varint32 codec.
//!
//! The record format stores text-length tags as a restricted varint: the
//! value is laid out in four 7-bit groups, most significant first, with
//! the continuation bit (0x80) set on every byte except the last. The
//! width never varies, so the codec is really a 28-bit big-endian integer
//! whose first byte is guaranteed to have its high bit set. That guarantee
//! is what lets the record decoder distinguish a text tag from the
//! one-byte fixed-type tags (0, 1, 2, 4), none of which reach 0x80.
//!
//! ## Layout
//!
//! ```text
//! byte 0: 1vvvvvvv   bits 27..21
//! byte 1: 1vvvvvvv   bits 20..14
//! byte 2: 1vvvvvvv   bits 13..7
//! byte 3: 0vvvvvvv   bits 6..0
//! ```
//!
//! Values above [`VARINT32_MAX`] do not fit and are rejected on encode.

use eyre::{ensure, Result};

/// Encoded width in bytes. Never varies.
pub const VARINT32_SIZE: usize = 4;

/// Largest encodable value: 28 payload bits.
pub const VARINT32_MAX: u32 = (1 << 28) - 1;

/// Writes `value` at `offset` as a 4-byte varint32.
pub fn write_varint32(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    ensure!(
        value <= VARINT32_MAX,
        "value {} does not fit in a varint32 (max {})",
        value,
        VARINT32_MAX
    );
    ensure!(
        offset.checked_add(VARINT32_SIZE).is_some_and(|end| end <= buf.len()),
        "varint32 write at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    buf[offset] = 0x80 | ((value >> 21) & 0x7F) as u8;
    buf[offset + 1] = 0x80 | ((value >> 14) & 0x7F) as u8;
    buf[offset + 2] = 0x80 | ((value >> 7) & 0x7F) as u8;
    buf[offset + 3] = (value & 0x7F) as u8;
    Ok(())
}

/// Reads the 4-byte varint32 at `offset`.
///
/// Continuation bits are masked off rather than verified; the emulated
/// format always sets them on encode but never checks them on decode.
pub fn read_varint32(buf: &[u8], offset: usize) -> Result<u32> {
    ensure!(
        offset.checked_add(VARINT32_SIZE).is_some_and(|end| end <= buf.len()),
        "varint32 read at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    let value = ((buf[offset] & 0x7F) as u32) << 21
        | ((buf[offset + 1] & 0x7F) as u32) << 14
        | ((buf[offset + 2] & 0x7F) as u32) << 7
        | (buf[offset + 3] & 0x7F) as u32;
    Ok(value)
}
