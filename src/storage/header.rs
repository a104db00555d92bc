//! # Database File Header
//!
//! Page 1 of every database file begins with a 100-byte header identifying
//! the file and pinning the handful of format parameters this engine
//! supports. The layout is bit-compatible with the well-known format it
//! emulates:
//!
//! ```text
//! offset  size  field                     value in this profile
//! 0       16    magic                     "SQLite format 3\0"
//! 16      2     page size (BE)            set at creation
//! 18      1     file format, write        1
//! 19      1     file format, read         1
//! 20      1     reserved space per page   0
//! 21      1     max embedded payload      64
//! 22      1     min embedded payload      32
//! 23      1     leaf payload              32
//! 24      4     file change counter       0
//! 28      4     unused                    0
//! 32      4     freelist head page        0
//! 36      4     freelist page count       0
//! 40      4     schema cookie             0
//! 44      4     schema format             1
//! 48      4     suggested cache size      20000
//! 52      4     vacuum root               0
//! 56      4     text encoding             1 (UTF-8)
//! 60      4     user version              0
//! 64      4     incremental vacuum        0
//! 68      32    reserved                  0
//! ```
//!
//! The change counter, schema cookie, and user version are mutable in the
//! emulated format, so [`FileHeader::validate`] accepts any value there.
//! Every other field is a constant of this profile and a mismatch means
//! the file was not written by a compatible engine.

use eyre::{ensure, eyre, Result};
use zerocopy::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    FILE_FORMAT_VERSION, FILE_HEADER_SIZE, LEAF_PAYLOAD_FRACTION, MAX_EMBEDDED_PAYLOAD_FRACTION,
    MIN_EMBEDDED_PAYLOAD_FRACTION, SCHEMA_FORMAT, SUGGESTED_CACHE_SIZE, TEXT_ENCODING_UTF8,
};

/// Magic bytes at the start of every database file.
pub const MAGIC: [u8; 16] = *b"SQLite format 3\0";

/// The 100-byte header at the start of page 1.
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct FileHeader {
    magic: [u8; 16],
    page_size: U16,
    file_format_write: u8,
    file_format_read: u8,
    reserved_space: u8,
    max_embedded_payload: u8,
    min_embedded_payload: u8,
    leaf_payload: u8,
    change_counter: U32,
    unused: U32,
    freelist_head: U32,
    freelist_pages: U32,
    schema_cookie: U32,
    schema_format: U32,
    cache_size: U32,
    vacuum_root: U32,
    text_encoding: U32,
    user_version: U32,
    incremental_vacuum: U32,
    reserved: [u8; 32],
}

const _: () = assert!(core::mem::size_of::<FileHeader>() == FILE_HEADER_SIZE);

impl FileHeader {
    /// Builds the header for a freshly created file.
    pub fn new(page_size: u16) -> Self {
        Self {
            magic: MAGIC,
            page_size: U16::new(page_size),
            file_format_write: FILE_FORMAT_VERSION,
            file_format_read: FILE_FORMAT_VERSION,
            reserved_space: 0,
            max_embedded_payload: MAX_EMBEDDED_PAYLOAD_FRACTION,
            min_embedded_payload: MIN_EMBEDDED_PAYLOAD_FRACTION,
            leaf_payload: LEAF_PAYLOAD_FRACTION,
            change_counter: U32::new(0),
            unused: U32::new(0),
            freelist_head: U32::new(0),
            freelist_pages: U32::new(0),
            schema_cookie: U32::new(0),
            schema_format: U32::new(SCHEMA_FORMAT),
            cache_size: U32::new(SUGGESTED_CACHE_SIZE),
            vacuum_root: U32::new(0),
            text_encoding: U32::new(TEXT_ENCODING_UTF8),
            user_version: U32::new(0),
            incremental_vacuum: U32::new(0),
            reserved: [0; 32],
        }
    }

    /// Borrows a header view over the first 100 bytes of `bytes` and
    /// checks the magic. Full profile validation is [`Self::validate`].
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= FILE_HEADER_SIZE,
            "corrupt file header: {} bytes, need {}",
            bytes.len(),
            FILE_HEADER_SIZE
        );
        let header = Self::ref_from_bytes(&bytes[..FILE_HEADER_SIZE])
            .map_err(|_| eyre!("corrupt file header: unaligned or undersized buffer"))?;
        ensure!(
            header.magic == MAGIC,
            "corrupt file header: bad magic bytes"
        );
        Ok(header)
    }

    /// Checks every profile constant. Fields the format treats as mutable
    /// (change counter, schema cookie, user version) are not constrained.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.file_format_write == FILE_FORMAT_VERSION
                && self.file_format_read == FILE_FORMAT_VERSION,
            "corrupt file header: unsupported file format version {}/{}",
            self.file_format_write,
            self.file_format_read
        );
        ensure!(
            self.reserved_space == 0,
            "corrupt file header: nonzero reserved space {}",
            self.reserved_space
        );
        ensure!(
            self.max_embedded_payload == MAX_EMBEDDED_PAYLOAD_FRACTION
                && self.min_embedded_payload == MIN_EMBEDDED_PAYLOAD_FRACTION
                && self.leaf_payload == LEAF_PAYLOAD_FRACTION,
            "corrupt file header: unexpected payload fractions {}/{}/{}",
            self.max_embedded_payload,
            self.min_embedded_payload,
            self.leaf_payload
        );
        ensure!(
            self.freelist_head.get() == 0 && self.freelist_pages.get() == 0,
            "corrupt file header: freelist fields must be zero"
        );
        ensure!(
            self.schema_format.get() == SCHEMA_FORMAT,
            "corrupt file header: schema format {}",
            self.schema_format.get()
        );
        ensure!(
            self.cache_size.get() == SUGGESTED_CACHE_SIZE,
            "corrupt file header: cache size {}",
            self.cache_size.get()
        );
        ensure!(
            self.vacuum_root.get() == 0 && self.incremental_vacuum.get() == 0,
            "corrupt file header: vacuum fields must be zero"
        );
        ensure!(
            self.text_encoding.get() == TEXT_ENCODING_UTF8,
            "corrupt file header: text encoding {}",
            self.text_encoding.get()
        );
        Ok(())
    }

    /// Serializes the header into the front of a page-1 buffer.
    pub fn write_to(&self, page: &mut [u8]) -> Result<()> {
        ensure!(
            page.len() >= FILE_HEADER_SIZE,
            "page buffer of {} bytes cannot hold the {}-byte file header",
            page.len(),
            FILE_HEADER_SIZE
        );
        page[..FILE_HEADER_SIZE].copy_from_slice(self.as_bytes());
        Ok(())
    }

    zerocopy_getters! {
        page_size: u16,
        change_counter: u32,
        schema_cookie: u32,
        user_version: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_header_bytes_are_bit_exact() {
        let header = FileHeader::new(1024);
        let bytes = header.as_bytes();
        assert_eq!(bytes.len(), 100);
        assert_eq!(&bytes[0..16], b"SQLite format 3\0");
        assert_eq!(&bytes[16..18], &[0x04, 0x00]); // 1024 big-endian
        assert_eq!(bytes[18], 1);
        assert_eq!(bytes[19], 1);
        assert_eq!(bytes[20], 0);
        assert_eq!(bytes[21], 64);
        assert_eq!(bytes[22], 32);
        assert_eq!(bytes[23], 32);
        assert_eq!(&bytes[32..36], &[0, 0, 0, 0]);
        assert_eq!(&bytes[36..40], &[0, 0, 0, 0]);
        assert_eq!(&bytes[44..48], &[0, 0, 0, 1]);
        assert_eq!(&bytes[48..52], &20000u32.to_be_bytes());
        assert_eq!(&bytes[52..56], &[0, 0, 0, 0]);
        assert_eq!(&bytes[56..60], &[0, 0, 0, 1]);
        assert_eq!(&bytes[64..68], &[0, 0, 0, 0]);
    }

    #[test]
    fn round_trip_through_bytes() {
        let header = FileHeader::new(4096);
        let mut page = vec![0u8; 4096];
        header.write_to(&mut page).unwrap();
        let parsed = FileHeader::from_bytes(&page).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.page_size(), 4096);
        assert_eq!(parsed.change_counter(), 0);
        assert_eq!(parsed.schema_cookie(), 0);
        assert_eq!(parsed.user_version(), 0);
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let header = FileHeader::new(1024);
        let mut page = vec![0u8; 1024];
        header.write_to(&mut page).unwrap();
        page[0] = b'X';
        let err = FileHeader::from_bytes(&page).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn truncated_buffer_is_corrupt() {
        let err = FileHeader::from_bytes(&[0u8; 40]).unwrap_err();
        assert!(err.to_string().contains("corrupt file header"));
    }

    #[test]
    fn profile_constant_mismatch_fails_validation() {
        let header = FileHeader::new(1024);
        let mut page = vec![0u8; 1024];
        header.write_to(&mut page).unwrap();
        page[21] = 63; // max embedded payload
        let parsed = FileHeader::from_bytes(&page).unwrap();
        let err = parsed.validate().unwrap_err();
        assert!(err.to_string().contains("payload fractions"));

        page[21] = 64;
        page[56..60].copy_from_slice(&2u32.to_be_bytes()); // text encoding
        let parsed = FileHeader::from_bytes(&page).unwrap();
        let err = parsed.validate().unwrap_err();
        assert!(err.to_string().contains("text encoding"));
    }

    #[test]
    fn mutable_fields_do_not_fail_validation() {
        let header = FileHeader::new(1024);
        let mut page = vec![0u8; 1024];
        header.write_to(&mut page).unwrap();
        page[24..28].copy_from_slice(&7u32.to_be_bytes()); // change counter
        page[40..44].copy_from_slice(&3u32.to_be_bytes()); // schema cookie
        page[60..64].copy_from_slice(&9u32.to_be_bytes()); // user version
        let parsed = FileHeader::from_bytes(&page).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.change_counter(), 7);
        assert_eq!(parsed.schema_cookie(), 3);
        assert_eq!(parsed.user_version(), 9);
    }
}
