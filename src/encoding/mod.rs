//! # Encoding Module
//!
//! The byte-level codecs everything else is built from. Two families:
//!
//! - [`ints`]: bounds-checked big-endian u16/u32 reads and writes into
//!   page buffers. Node headers, cell-pointer arrays, and cell images are
//!   all stitched together from these.
//! - [`varint`]: the fixed-width 4-byte varint32 the record codec uses for
//!   text-length tags. Unlike a general varint it always occupies exactly
//!   four bytes; the continuation bits only exist so a text tag can be
//!   told apart from a one-byte fixed-type tag by its high bit.
//!
//! All functions here are pure and total over their inputs: the only error
//! cases are out-of-range offsets and out-of-range values, reported via
//! `Result` rather than panics so corrupt pages can never take the process
//! down.

pub mod ints;
pub mod varint;

pub use ints::{read_u16, read_u32, write_u16, write_u32};
pub use varint::{read_varint32, write_varint32, VARINT32_MAX, VARINT32_SIZE};
