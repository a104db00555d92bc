//! # Record Codec
//!
//! Converts between a typed in-memory row ([`Record`], an ordered list of
//! [`Value`] fields) and the packed byte form stored as a table-leaf cell
//! payload. The packing is pure transformation; nothing here touches the
//! file.
//!
//! ## Wire Format
//!
//! ```text
//! +-------------+------------------------+--------------------------+
//! | header len  | one entry per field    | field bytes, no padding  |
//! | (1 byte,    | 0/1/2/4 = null/int8/   | ints big-endian at their |
//! | includes    |   int16/int32 (1 byte) | natural width, text raw  |
//! | itself)     | varint32(2*len + 13)   | and unterminated         |
//! |             |   = text (4 bytes)     |                          |
//! +-------------+------------------------+--------------------------+
//! ```
//!
//! A text entry's first byte always carries the high bit (varint32
//! continuation), and no fixed-type tag reaches 0x80, so the decoder can
//! walk the header without a schema. Field offsets into the data segment
//! accumulate from the declared widths: null contributes 0 bytes, int8 1,
//! int16 2, int32 4, text its declared length `(tag - 13) / 2`.
//!
//! ## Strictness
//!
//! [`Record::unpack`] rejects unknown type bytes, odd text tags, header
//! entries that overrun the declared header length, and data segments
//! shorter than the header promises. Text must be valid UTF-8. Bytes past
//! the described record are ignored, matching the emulated format.

mod builder;
mod record;
mod value;

pub use builder::RecordBuilder;
pub use record::Record;
pub use value::{FieldType, Value};
