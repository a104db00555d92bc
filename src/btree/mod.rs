//! # B-Tree Engine
//!
//! Interprets pages as B-Tree nodes and implements search, insertion, and
//! node splitting over the pager. Two tree classes share the machinery:
//!
//! - **Table trees** map a 32-bit key to an opaque payload (a packed
//!   record). Payloads live only in leaves; internal cells carry key
//!   copies for routing, with *keys <= cell key* in the cell's child.
//! - **Index trees** map an indexed key to the primary key of its row.
//!   Entries live in leaves *and* internal cells (a classic B-Tree), with
//!   *keys < cell key* in the cell's child. Duplicate indexed keys with
//!   distinct primary keys are allowed.
//!
//! ## Node Layout
//!
//! A node header sits at page offset 0 (offset 100 on page 1, after the
//! file header), followed by the cell-pointer array. Cell images grow
//! downward from the page end; the pointer array grows upward; the gap
//! between `free_offset` and `cells_offset` is the node's free space.
//!
//! ```text
//! +-----------------+--------------------+--------------~~---+--------+
//! | node header     | cell-pointer array |    free space     | cells  |
//! | 8 B leaf        | n_cells x u16 BE,  |                   | newest |
//! | 12 B internal   | ascending by key   |                   | lowest |
//! +-----------------+--------------------+--------------~~---+--------+
//! 0 (or 100)        ^header end          ^free_offset        ^cells_offset
//! ```
//!
//! ```text
//! header:  type(1) free_offset(2) n_cells(2) cells_offset(2) zero(1)
//!          right_page(4, internal only)
//! types:   0x05 table-internal  0x0D table-leaf
//!          0x02 index-internal  0x0A index-leaf
//! ```
//!
//! ## Cell Images
//!
//! | kind           | layout (big-endian u32 fields)                  | size   |
//! |----------------|--------------------------------------------------|--------|
//! | table-internal | child @0, key @4                                 | 8      |
//! | table-leaf     | payload size @0, key @4, payload @8              | 8 + n  |
//! | index-internal | child @0, preamble @4, key @8, primary key @12   | 16     |
//! | index-leaf     | preamble @0, key @4, primary key @8              | 12     |
//!
//! ## Mutation Model
//!
//! Nodes are decoded from owned page buffers and written back explicitly;
//! nothing is flushed implicitly. Insertion splits full nodes on the way
//! down, so by the time a leaf is reached every ancestor has room for a
//! promoted divider. When a root fills up, its contents move to a fresh
//! clone page and the root page is re-initialized as an internal node
//! over the clone, so root page numbers held by callers never change.

mod cell;
mod cursor;
mod node;
mod tree;

pub use cell::{
    Cell, INDEX_CELL_PREAMBLE, INDEX_INTERNAL_CELL_SIZE, INDEX_LEAF_CELL_SIZE,
    TABLE_INTERNAL_CELL_SIZE, TABLE_LEAF_CELL_HEADER,
};
pub use cursor::{Cursor, Entry};
pub use node::{Node, PageKind};
pub use tree::BTree;
