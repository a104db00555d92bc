//! In-memory view of one B-Tree page: header fields, the cell pointer
//! array, and the cell area growing up from the end of the page.

use eyre::{bail, ensure, Result};

use crate::btree::cell::Cell;
use crate::config::FILE_HEADER_SIZE;
use crate::encoding::{read_u16, read_u32, write_u16, write_u32};
use crate::storage::MemPage;

/// Page type byte, first byte of the node header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PageKind {
    IndexInternal = 0x02,
    TableInternal = 0x05,
    IndexLeaf = 0x0A,
    TableLeaf = 0x0D,
}

impl PageKind {
    pub fn from_byte(byte: u8) -> Result<PageKind> {
        match byte {
            0x02 => Ok(PageKind::IndexInternal),
            0x05 => Ok(PageKind::TableInternal),
            0x0A => Ok(PageKind::IndexLeaf),
            0x0D => Ok(PageKind::TableLeaf),
            _ => bail!("unknown page type byte 0x{:02x}", byte),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, PageKind::TableLeaf | PageKind::IndexLeaf)
    }

    pub fn is_internal(self) -> bool {
        !self.is_leaf()
    }

    pub fn is_table(self) -> bool {
        matches!(self, PageKind::TableInternal | PageKind::TableLeaf)
    }

    pub fn is_index(self) -> bool {
        !self.is_table()
    }

    /// The internal kind of the same tree class. A leaf that splits all
    /// the way to the root turns the root into this kind.
    pub fn internal_kind(self) -> PageKind {
        if self.is_table() {
            PageKind::TableInternal
        } else {
            PageKind::IndexInternal
        }
    }

    /// Node header size: internal nodes carry a right-page pointer at
    /// bytes 8..12, leaves start their pointer array there instead.
    pub fn header_size(self) -> usize {
        if self.is_internal() {
            12
        } else {
            8
        }
    }
}

/// Byte offset of the node header within the page. Page 1 shares its
/// page with the file header, so its node starts at byte 100.
fn node_offset(page_number: u32) -> usize {
    if page_number == 1 {
        FILE_HEADER_SIZE
    } else {
        0
    }
}

/// A page interpreted as a B-Tree node.
///
/// Header fields are cached in native integers; [`Node::flush_header`]
/// writes them back into the page buffer. Cell mutations keep the buffer
/// and the cached fields in sync as they go.
#[derive(Debug)]
pub struct Node {
    page: MemPage,
    kind: PageKind,
    free_offset: u16,
    n_cells: u16,
    cells_offset: u16,
    right_page: u32,
}

impl Node {
    /// Parses the node header out of `page`.
    pub fn from_page(page: MemPage) -> Result<Node> {
        let offset = node_offset(page.number);
        ensure!(
            page.data.len() >= offset + 12,
            "page {} too small for a node header",
            page.number
        );
        let kind = PageKind::from_byte(page.data[offset])
            .map_err(|e| e.wrap_err(format!("page {}", page.number)))?;
        let free_offset = read_u16(&page.data, offset + 1)?;
        let n_cells = read_u16(&page.data, offset + 3)?;
        let cells_offset = read_u16(&page.data, offset + 5)?;
        let right_page = if kind.is_internal() {
            read_u32(&page.data, offset + 8)?
        } else {
            0
        };
        ensure!(
            free_offset as usize <= cells_offset as usize
                && cells_offset as usize <= page.data.len(),
            "page {} has inverted cell area ({}..{} in {} bytes)",
            page.number,
            free_offset,
            cells_offset,
            page.data.len()
        );
        Ok(Node {
            page,
            kind,
            free_offset,
            n_cells,
            cells_offset,
            right_page,
        })
    }

    /// Formats `page` as an empty node of `kind`, preserving the file
    /// header when the page is page 1. Reinitializing a page that held
    /// cells is allowed; the old contents are wiped.
    pub fn init(mut page: MemPage, kind: PageKind) -> Result<Node> {
        let offset = node_offset(page.number);
        ensure!(
            page.data.len() <= u16::MAX as usize && page.data.len() >= offset + 12,
            "page size {} unusable for a node",
            page.data.len()
        );
        for byte in &mut page.data[offset..] {
            *byte = 0;
        }
        let mut node = Node {
            free_offset: (offset + kind.header_size()) as u16,
            n_cells: 0,
            cells_offset: page.data.len() as u16,
            right_page: 0,
            page,
            kind,
        };
        node.flush_header()?;
        Ok(node)
    }

    pub fn number(&self) -> u32 {
        self.page.number
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn n_cells(&self) -> u16 {
        self.n_cells
    }

    pub fn right_page(&self) -> u32 {
        self.right_page
    }

    pub fn set_right_page(&mut self, page_number: u32) -> Result<()> {
        ensure!(
            self.kind.is_internal(),
            "leaf node {} has no right-page pointer",
            self.page.number
        );
        self.right_page = page_number;
        self.flush_header()
    }

    pub fn into_page(self) -> MemPage {
        self.page
    }

    pub fn page(&self) -> &MemPage {
        &self.page
    }

    /// Writes the cached header fields back into the page buffer. Never
    /// touches the pointer array, so it is safe on leaves where that
    /// array starts at byte 8 of the node.
    pub fn flush_header(&mut self) -> Result<()> {
        let offset = node_offset(self.page.number);
        self.page.data[offset] = self.kind.as_byte();
        write_u16(&mut self.page.data, offset + 1, self.free_offset)?;
        write_u16(&mut self.page.data, offset + 3, self.n_cells)?;
        write_u16(&mut self.page.data, offset + 5, self.cells_offset)?;
        self.page.data[offset + 7] = 0;
        if self.kind.is_internal() {
            write_u32(&mut self.page.data, offset + 8, self.right_page)?;
        }
        Ok(())
    }

    fn array_start(&self) -> usize {
        node_offset(self.page.number) + self.kind.header_size()
    }

    /// Page-relative offset of cell `i`, from the pointer array.
    pub fn cell_offset(&self, i: u16) -> Result<usize> {
        ensure!(
            i < self.n_cells,
            "cell {} out of bounds (node {} has {} cells)",
            i,
            self.page.number,
            self.n_cells
        );
        Ok(read_u16(&self.page.data, self.array_start() + 2 * i as usize)? as usize)
    }

    /// Decodes cell `i`.
    pub fn cell(&self, i: u16) -> Result<Cell> {
        let offset = self.cell_offset(i)?;
        Cell::decode(self.kind, &self.page.data, offset)
    }

    /// Key of cell `i` without decoding the whole cell.
    pub fn key_of(&self, i: u16) -> Result<u32> {
        let offset = self.cell_offset(i)?;
        Cell::key_at(self.kind, &self.page.data, offset)
    }

    /// Raw encoded bytes of cell `i`.
    pub fn cell_bytes(&self, i: u16) -> Result<&[u8]> {
        let offset = self.cell_offset(i)?;
        let size = Cell::size_at(self.kind, &self.page.data, offset)?;
        ensure!(
            offset
                .checked_add(size)
                .is_some_and(|end| end <= self.page.data.len()),
            "cell {} of node {} runs past end of page",
            i,
            self.page.number
        );
        Ok(&self.page.data[offset..offset + size])
    }

    /// Unused bytes between the pointer array and the cell area.
    pub fn free_space(&self) -> usize {
        self.cells_offset as usize - self.free_offset as usize
    }

    /// Whether a cell of `size` bytes fits, counting its pointer entry.
    pub fn has_room_for(&self, size: usize) -> bool {
        self.free_space() >= size + 2
    }

    /// Opens a `size`-byte slot in the cell area and a pointer entry at
    /// position `i`, shifting later entries right. Returns the slot's
    /// page-relative offset.
    fn make_room(&mut self, i: u16, size: usize) -> Result<usize> {
        ensure!(
            i <= self.n_cells,
            "insert position {} out of bounds (node {} has {} cells)",
            i,
            self.page.number,
            self.n_cells
        );
        ensure!(
            self.has_room_for(size),
            "node {} is full ({} free, {} needed)",
            self.page.number,
            self.free_space(),
            size + 2
        );
        let offset = self.cells_offset as usize - size;
        let entry = self.array_start() + 2 * i as usize;
        let end = self.array_start() + 2 * self.n_cells as usize;
        self.page.data.copy_within(entry..end, entry + 2);
        write_u16(&mut self.page.data, entry, offset as u16)?;
        self.n_cells += 1;
        self.free_offset += 2;
        self.cells_offset = offset as u16;
        self.flush_header()?;
        Ok(offset)
    }

    /// Inserts `cell` at position `i`.
    pub fn insert_cell(&mut self, i: u16, cell: &Cell) -> Result<()> {
        ensure!(
            cell.kind() == self.kind,
            "cannot insert a {:?} cell into a {:?} node",
            cell.kind(),
            self.kind
        );
        let offset = self.make_room(i, cell.size())?;
        cell.encode(&mut self.page.data, offset)
    }

    /// Inserts an already encoded cell image at position `i`.
    pub(crate) fn insert_cell_raw(&mut self, i: u16, bytes: &[u8]) -> Result<()> {
        let offset = self.make_room(i, bytes.len())?;
        self.page.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Structural checks beyond what [`Node::from_page`] enforces: the
    /// pointer array length matches the cell count, every cell lies in
    /// the cell area, keys are ordered (strictly for tables), and
    /// internal nodes have a right child.
    pub fn validate(&self) -> Result<()> {
        let expected_free = self.array_start() + 2 * self.n_cells as usize;
        ensure!(
            self.free_offset as usize == expected_free,
            "node {}: free offset {} does not match {} cells",
            self.page.number,
            self.free_offset,
            self.n_cells
        );
        if self.kind.is_internal() && self.n_cells > 0 {
            ensure!(
                self.right_page != 0,
                "internal node {} missing right child",
                self.page.number
            );
        }
        let mut prev_key = None;
        for i in 0..self.n_cells {
            let offset = self.cell_offset(i)?;
            ensure!(
                offset >= self.cells_offset as usize,
                "node {}: cell {} at offset {} inside the free area",
                self.page.number,
                i,
                offset
            );
            let size = Cell::size_at(self.kind, &self.page.data, offset)?;
            ensure!(
                offset
                    .checked_add(size)
                    .is_some_and(|end| end <= self.page.data.len()),
                "node {}: cell {} runs past end of page",
                self.page.number,
                i
            );
            let key = Cell::key_at(self.kind, &self.page.data, offset)?;
            if let Some(prev) = prev_key {
                let ordered = if self.kind.is_table() {
                    prev < key
                } else {
                    prev <= key
                };
                ensure!(
                    ordered,
                    "node {}: keys out of order at cell {} ({} then {})",
                    self.page.number,
                    i,
                    prev,
                    key
                );
            }
            prev_key = Some(key);
        }
        Ok(())
    }
}
