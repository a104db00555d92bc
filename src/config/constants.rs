//! # Engine Constants
//!
//! Numeric constants for the on-disk format and the engine defaults.
//!
//! ## Dependency Notes
//!
//! - `DEFAULT_PAGE_SIZE` must leave room on page 1 for the 100-byte file
//!   header plus at least one node header and one cell; the compile-time
//!   checks below enforce the structural part.
//! - Node headers store offsets as big-endian u16, so a page can never be
//!   larger than `MAX_PAGE_SIZE`. `Pager::set_page_size` deliberately does
//!   not validate its argument (the caller owns that decision), but every
//!   supported size fits these bounds.
//! - The `*_FRACTION`, `SCHEMA_FORMAT`, `SUGGESTED_CACHE_SIZE` and
//!   `TEXT_ENCODING_UTF8` values are fixed by the emulated file format and
//!   are validated byte-for-byte when an existing file is opened.

/// Page size written into freshly created database files.
pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// Largest page size the node header can address (offsets are u16).
pub const MAX_PAGE_SIZE: usize = 32768;

/// Size of the file header at the start of page 1.
pub const FILE_HEADER_SIZE: usize = 100;

/// Upper bound on a packed record's header length (it is stored in one byte).
pub const MAX_RECORD_HEADER: usize = 255;

/// File format version stamped into bytes 18 and 19 of the header.
pub const FILE_FORMAT_VERSION: u8 = 1;

/// Embedded payload fractions at header bytes 21..24. Inherited from the
/// emulated format; this engine never spills payloads to overflow pages,
/// so they are stored and checked but otherwise unused.
pub const MAX_EMBEDDED_PAYLOAD_FRACTION: u8 = 64;
pub const MIN_EMBEDDED_PAYLOAD_FRACTION: u8 = 32;
pub const LEAF_PAYLOAD_FRACTION: u8 = 32;

/// Schema format number at header offset 44.
pub const SCHEMA_FORMAT: u32 = 1;

/// Suggested cache size at header offset 48. A profile constant carried
/// verbatim from the emulated format, not derived from anything.
pub const SUGGESTED_CACHE_SIZE: u32 = 20000;

/// Text encoding marker at header offset 56 (1 = UTF-8).
pub const TEXT_ENCODING_UTF8: u32 = 1;

const _: () = assert!(DEFAULT_PAGE_SIZE.is_power_of_two());
const _: () = assert!(DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE);
const _: () = assert!(MAX_PAGE_SIZE <= u16::MAX as usize);
// Page 1 must fit the file header, an internal node header, and at least
// one cell-pointer entry plus one 16-byte cell.
const _: () = assert!(DEFAULT_PAGE_SIZE >= FILE_HEADER_SIZE + 12 + 2 + 16);
