//! # ShaleDB - Educational Disk-Backed B-Tree Storage Engine
//!
//! ShaleDB is a small storage engine over a SQLite-compatible file
//! format: a paged file holding B-Trees for tables and indexes, with
//! rows packed into a compact record format. This implementation
//! prioritizes:
//!
//! - **Format fidelity**: Every page, cell, and record is bit-exact
//!   with the on-disk layout it emulates
//! - **Stable roots**: Root pages never move, so callers can hold root
//!   page numbers across any number of inserts
//! - **Explicit failure**: Corrupt headers, out-of-bounds pages, and
//!   duplicate keys surface as errors, never as silent misbehavior
//!
//! ## Quick Start
//!
//! ```ignore
//! use shaledb::{BTree, RecordBuilder};
//!
//! let mut tree = BTree::open("./library.db")?;
//!
//! let record = RecordBuilder::new()
//!     .append_text("The Pager")
//!     .append_int32(1977)
//!     .finish();
//! tree.insert_in_table(1, 42, &record.pack()?)?;
//!
//! let payload = tree.find(1, 42)?;
//! ```
//!
//! ## Architecture
//!
//! ShaleDB uses a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    B-Tree Engine (find/insert)       │
//! ├───────────────────┬─────────────────┤
//! │   Node & Cells    │     Cursor       │
//! ├───────────────────┴─────────────────┤
//! │     Record Serialization Layer       │
//! ├─────────────────────────────────────┤
//! │      Storage Layer (Pager)           │
//! ├─────────────────────────────────────┤
//! │        Buffered File I/O             │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Layout
//!
//! Everything lives in one file of fixed-size pages, numbered from 1:
//!
//! ```text
//! database.db
//! ├── page 1               # 100-byte file header + root node
//! ├── page 2               # B-Tree node
//! ├── page 3               # B-Tree node
//! └── ...
//! ```
//!
//! Table trees map `u32` keys to packed records; index trees map
//! indexed keys to the primary keys of the rows that hold them.
//!
//! ## Module Overview
//!
//! - [`storage`]: File header, pager, in-memory pages
//! - [`btree`]: Table and index trees, nodes, cells, cursors
//! - [`records`]: Packing and unpacking of row payloads
//! - [`encoding`]: Big-endian integer and varint primitives
//! - [`config`]: File format constants

#[macro_use]
mod macros;

pub mod btree;
pub mod config;
pub mod encoding;
pub mod records;
pub mod storage;

pub use btree::{BTree, Cell, Cursor, Entry, Node, PageKind};
pub use records::{FieldType, Record, RecordBuilder, Value};
pub use storage::{FileHeader, MemPage, Pager};
