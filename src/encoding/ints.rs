//! Big-endian integer accessors for page buffers.
//!
//! Every multi-byte integer in the file format (node header fields,
//! cell-pointer entries, cell keys, child pointers, payload sizes) is
//! big-endian. These helpers take an explicit offset and validate it
//! against the buffer length before touching memory, so a corrupt offset
//! read from disk surfaces as an error instead of a panic or a wild read.

use eyre::{ensure, Result};

/// Reads a big-endian u16 at `offset`.
pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    ensure!(
        offset.checked_add(2).is_some_and(|end| end <= buf.len()),
        "u16 read at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    Ok(u16::from_be_bytes([buf[offset], buf[offset + 1]]))
}

/// Writes a big-endian u16 at `offset`.
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) -> Result<()> {
    ensure!(
        offset.checked_add(2).is_some_and(|end| end <= buf.len()),
        "u16 write at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Reads a big-endian u32 at `offset`.
pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    ensure!(
        offset.checked_add(4).is_some_and(|end| end <= buf.len()),
        "u32 read at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    Ok(u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

/// Writes a big-endian u32 at `offset`.
pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    ensure!(
        offset.checked_add(4).is_some_and(|end| end <= buf.len()),
        "u32 write at offset {} past end of {}-byte buffer",
        offset,
        buf.len()
    );
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_round_trip() {
        let mut buf = [0u8; 8];
        write_u16(&mut buf, 3, 0xBEEF).unwrap();
        assert_eq!(read_u16(&buf, 3).unwrap(), 0xBEEF);
    }

    #[test]
    fn u16_is_big_endian() {
        let mut buf = [0u8; 2];
        write_u16(&mut buf, 0, 0x0102).unwrap();
        assert_eq!(buf, [0x01, 0x02]);
    }

    #[test]
    fn u32_round_trip() {
        let mut buf = [0u8; 16];
        write_u32(&mut buf, 5, 0xDEADBEEF).unwrap();
        assert_eq!(read_u32(&buf, 5).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn u32_is_big_endian() {
        let mut buf = [0u8; 4];
        write_u32(&mut buf, 0, 0x01020304).unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn read_past_end_fails() {
        let buf = [0u8; 4];
        assert!(read_u16(&buf, 3).is_err());
        assert!(read_u32(&buf, 1).is_err());
        assert!(read_u32(&buf, 4).is_err());
    }

    #[test]
    fn write_past_end_fails() {
        let mut buf = [0u8; 4];
        assert!(write_u16(&mut buf, 3, 1).is_err());
        assert!(write_u32(&mut buf, 2, 1).is_err());
    }

    #[test]
    fn offset_overflow_is_an_error_not_a_panic() {
        let buf = [0u8; 4];
        assert!(read_u16(&buf, usize::MAX).is_err());
        assert!(read_u32(&buf, usize::MAX - 1).is_err());
    }

    #[test]
    fn boundary_offsets_work() {
        let mut buf = [0u8; 6];
        write_u16(&mut buf, 4, 77).unwrap();
        assert_eq!(read_u16(&buf, 4).unwrap(), 77);
        write_u32(&mut buf, 2, 0x0A0B0C0D).unwrap();
        assert_eq!(read_u32(&buf, 2).unwrap(), 0x0A0B0C0D);
    }
}
