//! # Storage Module
//!
//! The file-facing layer: a [`Pager`] that maps 1-based page numbers onto
//! byte ranges of a single database file, and the typed [`FileHeader`]
//! occupying the first 100 bytes of page 1.
//!
//! ## Ownership Model
//!
//! There is deliberately no page cache and no shared memory. Every
//! [`Pager::read_page`] seeks and reads into a freshly allocated buffer
//! owned by the caller; nothing reaches the file again until the caller
//! hands the buffer back to [`Pager::write_page`]. Two reads of the same
//! page produce two independent copies with no aliasing between them.
//!
//! ```text
//!             read_page(n)                write_page(&page)
//!   file ----------------> MemPage (owned) ----------------> file
//!            copy out            mutate            copy in
//! ```
//!
//! This copy-on-read / explicit-write contract is what the B-Tree layer is
//! written against, and it keeps the interface open to a future cache:
//! all page traffic already funnels through `read_page`/`write_page`.
//!
//! ## Page Addressing
//!
//! Pages are numbered from 1; page `n` occupies file bytes
//! `(n-1)*page_size .. n*page_size`. Page 1 additionally begins with the
//! 100-byte file header, so its node body starts at offset 100. A page
//! allocated but never written has no bytes in the file yet; reading it
//! returns zeroes (short reads are zero-padded).

mod header;
mod pager;

pub use header::{FileHeader, MAGIC};
pub use pager::{MemPage, Pager};
