//! Cell images: one key-bearing entry of a node, as stored on disk.

use eyre::{bail, ensure, Result};

use crate::btree::node::PageKind;
use crate::encoding::{read_u32, write_u32};

/// Size of a table-internal cell image.
pub const TABLE_INTERNAL_CELL_SIZE: usize = 8;
/// Fixed prefix of a table-leaf cell image (payload follows).
pub const TABLE_LEAF_CELL_HEADER: usize = 8;
/// Size of an index-internal cell image.
pub const INDEX_INTERNAL_CELL_SIZE: usize = 16;
/// Size of an index-leaf cell image.
pub const INDEX_LEAF_CELL_SIZE: usize = 12;

/// Filler bytes in index cells: the emulated format stores the two keys
/// as an embedded two-int record, and these four bytes are that record's
/// size and header. Written on encode, not interpreted on decode.
pub const INDEX_CELL_PREAMBLE: [u8; 4] = [0x0B, 0x03, 0x04, 0x04];

/// A decoded cell. The variant always matches the kind of the node the
/// cell came from or is headed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Routing entry of a table tree: keys <= `key` live under `child`.
    TableInternal { key: u32, child: u32 },
    /// A table row: `key` plus its packed payload bytes.
    TableLeaf { key: u32, payload: Vec<u8> },
    /// Index entry with routing: keys < `key` live under `child`.
    IndexInternal { key: u32, primary_key: u32, child: u32 },
    /// Index entry: indexed `key` referencing `primary_key`.
    IndexLeaf { key: u32, primary_key: u32 },
}

impl Cell {
    pub fn kind(&self) -> PageKind {
        match self {
            Cell::TableInternal { .. } => PageKind::TableInternal,
            Cell::TableLeaf { .. } => PageKind::TableLeaf,
            Cell::IndexInternal { .. } => PageKind::IndexInternal,
            Cell::IndexLeaf { .. } => PageKind::IndexLeaf,
        }
    }

    pub fn key(&self) -> u32 {
        match self {
            Cell::TableInternal { key, .. }
            | Cell::TableLeaf { key, .. }
            | Cell::IndexInternal { key, .. }
            | Cell::IndexLeaf { key, .. } => *key,
        }
    }

    /// Child page pointer, for internal cells.
    pub fn child(&self) -> Option<u32> {
        match self {
            Cell::TableInternal { child, .. } | Cell::IndexInternal { child, .. } => Some(*child),
            _ => None,
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Cell::TableInternal { .. } => TABLE_INTERNAL_CELL_SIZE,
            Cell::TableLeaf { payload, .. } => TABLE_LEAF_CELL_HEADER + payload.len(),
            Cell::IndexInternal { .. } => INDEX_INTERNAL_CELL_SIZE,
            Cell::IndexLeaf { .. } => INDEX_LEAF_CELL_SIZE,
        }
    }

    /// Encodes the cell image into `buf[offset..offset + self.size()]`.
    pub fn encode(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        ensure!(
            offset
                .checked_add(self.size())
                .is_some_and(|end| end <= buf.len()),
            "cell of {} bytes at offset {} past end of {}-byte page",
            self.size(),
            offset,
            buf.len()
        );
        match self {
            Cell::TableInternal { key, child } => {
                write_u32(buf, offset, *child)?;
                write_u32(buf, offset + 4, *key)?;
            }
            Cell::TableLeaf { key, payload } => {
                write_u32(buf, offset, payload.len() as u32)?;
                write_u32(buf, offset + 4, *key)?;
                buf[offset + 8..offset + 8 + payload.len()].copy_from_slice(payload);
            }
            Cell::IndexInternal {
                key,
                primary_key,
                child,
            } => {
                write_u32(buf, offset, *child)?;
                buf[offset + 4..offset + 8].copy_from_slice(&INDEX_CELL_PREAMBLE);
                write_u32(buf, offset + 8, *key)?;
                write_u32(buf, offset + 12, *primary_key)?;
            }
            Cell::IndexLeaf { key, primary_key } => {
                buf[offset..offset + 4].copy_from_slice(&INDEX_CELL_PREAMBLE);
                write_u32(buf, offset + 4, *key)?;
                write_u32(buf, offset + 8, *primary_key)?;
            }
        }
        Ok(())
    }

    /// Decodes a cell of `kind` at `offset`.
    pub fn decode(kind: PageKind, buf: &[u8], offset: usize) -> Result<Cell> {
        let cell = match kind {
            PageKind::TableInternal => Cell::TableInternal {
                child: read_u32(buf, offset)?,
                key: read_u32(buf, offset + 4)?,
            },
            PageKind::TableLeaf => {
                let size = read_u32(buf, offset)? as usize;
                let key = read_u32(buf, offset + 4)?;
                let start = offset + TABLE_LEAF_CELL_HEADER;
                ensure!(
                    start.checked_add(size).is_some_and(|end| end <= buf.len()),
                    "table-leaf payload of {} bytes at offset {} past end of {}-byte page",
                    size,
                    offset,
                    buf.len()
                );
                Cell::TableLeaf {
                    key,
                    payload: buf[start..start + size].to_vec(),
                }
            }
            PageKind::IndexInternal => Cell::IndexInternal {
                child: read_u32(buf, offset)?,
                key: read_u32(buf, offset + 8)?,
                primary_key: read_u32(buf, offset + 12)?,
            },
            PageKind::IndexLeaf => Cell::IndexLeaf {
                key: read_u32(buf, offset + 4)?,
                primary_key: read_u32(buf, offset + 8)?,
            },
        };
        Ok(cell)
    }

    /// Encoded length of the cell starting at `offset`, without building
    /// a `Cell`. Table-leaf cells read their payload size field; the
    /// other kinds are fixed-width.
    pub fn size_at(kind: PageKind, buf: &[u8], offset: usize) -> Result<usize> {
        let size = match kind {
            PageKind::TableInternal => TABLE_INTERNAL_CELL_SIZE,
            PageKind::TableLeaf => TABLE_LEAF_CELL_HEADER + read_u32(buf, offset)? as usize,
            PageKind::IndexInternal => INDEX_INTERNAL_CELL_SIZE,
            PageKind::IndexLeaf => INDEX_LEAF_CELL_SIZE,
        };
        Ok(size)
    }

    /// Reads just the key of the cell at `offset`, for search paths that
    /// do not need the payload copied out.
    pub fn key_at(kind: PageKind, buf: &[u8], offset: usize) -> Result<u32> {
        match kind {
            PageKind::TableInternal | PageKind::TableLeaf | PageKind::IndexLeaf => {
                read_u32(buf, offset + 4)
            }
            PageKind::IndexInternal => read_u32(buf, offset + 8),
        }
    }

    /// The divider to promote into a parent when a node splits and this
    /// cell is the median: it carries the median key (and primary key for
    /// index trees) and points at the new sibling.
    pub fn divider(&self, sibling: u32) -> Cell {
        match self {
            Cell::TableInternal { key, .. } | Cell::TableLeaf { key, .. } => Cell::TableInternal {
                key: *key,
                child: sibling,
            },
            Cell::IndexInternal {
                key, primary_key, ..
            }
            | Cell::IndexLeaf { key, primary_key } => Cell::IndexInternal {
                key: *key,
                primary_key: *primary_key,
                child: sibling,
            },
        }
    }
}

impl Cell {
    pub(crate) fn expect_child(&self) -> Result<u32> {
        match self.child() {
            Some(child) => Ok(child),
            None => bail!("{:?} cell has no child pointer", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_internal_image() {
        let cell = Cell::TableInternal { key: 35, child: 3 };
        assert_eq!(cell.size(), 8);
        let mut buf = vec![0u8; 32];
        cell.encode(&mut buf, 8).unwrap();
        assert_eq!(&buf[8..16], &[0, 0, 0, 3, 0, 0, 0, 35]);
        let back = Cell::decode(PageKind::TableInternal, &buf, 8).unwrap();
        assert_eq!(back, cell);
        assert_eq!(Cell::key_at(PageKind::TableInternal, &buf, 8).unwrap(), 35);
    }

    #[test]
    fn table_leaf_image() {
        let cell = Cell::TableLeaf {
            key: 127,
            payload: b"foo127".to_vec(),
        };
        assert_eq!(cell.size(), 14);
        let mut buf = vec![0u8; 64];
        cell.encode(&mut buf, 20).unwrap();
        assert_eq!(&buf[20..24], &[0, 0, 0, 6]);
        assert_eq!(&buf[24..28], &[0, 0, 0, 127]);
        assert_eq!(&buf[28..34], b"foo127");
        let back = Cell::decode(PageKind::TableLeaf, &buf, 20).unwrap();
        assert_eq!(back, cell);
        assert_eq!(Cell::size_at(PageKind::TableLeaf, &buf, 20).unwrap(), 14);
    }

    #[test]
    fn index_cells_carry_the_preamble() {
        let internal = Cell::IndexInternal {
            key: 10,
            primary_key: 77,
            child: 4,
        };
        let mut buf = vec![0u8; 32];
        internal.encode(&mut buf, 0).unwrap();
        assert_eq!(&buf[0..4], &[0, 0, 0, 4]);
        assert_eq!(&buf[4..8], &INDEX_CELL_PREAMBLE);
        assert_eq!(&buf[8..12], &[0, 0, 0, 10]);
        assert_eq!(&buf[12..16], &[0, 0, 0, 77]);
        assert_eq!(Cell::decode(PageKind::IndexInternal, &buf, 0).unwrap(), internal);

        let leaf = Cell::IndexLeaf {
            key: 10,
            primary_key: 78,
        };
        leaf.encode(&mut buf, 16).unwrap();
        assert_eq!(&buf[16..20], &INDEX_CELL_PREAMBLE);
        assert_eq!(Cell::decode(PageKind::IndexLeaf, &buf, 16).unwrap(), leaf);
        assert_eq!(Cell::key_at(PageKind::IndexLeaf, &buf, 16).unwrap(), 10);
    }

    #[test]
    fn encode_out_of_bounds_fails() {
        let cell = Cell::TableLeaf {
            key: 1,
            payload: vec![0xAA; 16],
        };
        let mut buf = vec![0u8; 20];
        assert!(cell.encode(&mut buf, 0).is_err());
        let small = Cell::IndexLeaf {
            key: 1,
            primary_key: 2,
        };
        assert!(small.encode(&mut buf, 12).is_err());
        small.encode(&mut buf, 8).unwrap();
    }

    #[test]
    fn decode_truncated_payload_fails() {
        let mut buf = vec![0u8; 16];
        // Claims a 100-byte payload in a 16-byte buffer.
        write_u32(&mut buf, 0, 100).unwrap();
        write_u32(&mut buf, 4, 9).unwrap();
        let err = Cell::decode(PageKind::TableLeaf, &buf, 0).unwrap_err();
        assert!(err.to_string().contains("past end"));
    }

    #[test]
    fn dividers_point_at_the_sibling() {
        let median = Cell::TableLeaf {
            key: 64,
            payload: vec![1, 2, 3],
        };
        assert_eq!(
            median.divider(9),
            Cell::TableInternal { key: 64, child: 9 }
        );
        let median = Cell::IndexInternal {
            key: 5,
            primary_key: 50,
            child: 2,
        };
        assert_eq!(
            median.divider(7),
            Cell::IndexInternal {
                key: 5,
                primary_key: 50,
                child: 7
            }
        );
    }
}
