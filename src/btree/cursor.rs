//! In-order traversal over the entries of a tree.

use eyre::{bail, ensure, Result};
use smallvec::SmallVec;

use crate::btree::cell::Cell;
use crate::btree::tree::{BTree, MAX_DEPTH};

/// One entry yielded by a [`Cursor`].
///
/// Table trees yield their rows; index trees yield `(key, primary_key)`
/// pairs, which live in leaf cells and in internal cells alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Table { key: u32, payload: Vec<u8> },
    Index { key: u32, primary_key: u32 },
}

impl Entry {
    pub fn key(&self) -> u32 {
        match self {
            Entry::Table { key, .. } | Entry::Index { key, .. } => *key,
        }
    }

    fn from_cell(cell: Cell) -> Result<Entry> {
        match cell {
            Cell::TableLeaf { key, payload } => Ok(Entry::Table { key, payload }),
            Cell::IndexLeaf { key, primary_key }
            | Cell::IndexInternal {
                key, primary_key, ..
            } => Ok(Entry::Index { key, primary_key }),
            Cell::TableInternal { .. } => bail!("table-internal cells carry no entry"),
        }
    }
}

/// Traversal position within one node.
///
/// Leaves step through cells directly. For an internal node with `n`
/// cells, positions interleave children and cells: even position `2i`
/// descends into the child of cell `i`, odd position `2i + 1` visits
/// cell `i`, and position `2n` descends into the right page.
#[derive(Debug, Clone, Copy)]
struct Frame {
    page: u32,
    pos: u32,
}

/// Ascending scan over every entry of the tree rooted where the cursor
/// was opened. Entries come back in key order; index duplicates appear
/// in insertion order relative to each other.
pub struct Cursor<'a> {
    tree: &'a mut BTree,
    stack: SmallVec<[Frame; 8]>,
}

impl BTree {
    /// Opens a cursor positioned before the first entry of the tree
    /// rooted at `root`.
    pub fn cursor(&mut self, root: u32) -> Result<Cursor<'_>> {
        // Surfaces bad roots at open time rather than on the first step.
        self.get_node(root)?;
        let mut stack = SmallVec::new();
        stack.push(Frame { page: root, pos: 0 });
        Ok(Cursor { tree: self, stack })
    }
}

impl Cursor<'_> {
    /// Advances to the next entry, or `None` once the scan is done.
    pub fn next(&mut self) -> Result<Option<Entry>> {
        loop {
            let Some(frame) = self.stack.last().copied() else {
                return Ok(None);
            };
            let node = self.tree.get_node(frame.page)?;
            let n = node.n_cells() as u32;
            if node.kind().is_leaf() {
                if frame.pos < n {
                    self.bump();
                    return Entry::from_cell(node.cell(frame.pos as u16)?).map(Some);
                }
                self.stack.pop();
                continue;
            }
            if frame.pos > 2 * n {
                self.stack.pop();
            } else if frame.pos == 2 * n {
                self.bump();
                ensure!(
                    node.right_page() != 0,
                    "internal node {} missing right child",
                    frame.page
                );
                self.descend(node.right_page())?;
            } else if frame.pos % 2 == 0 {
                let child = node.cell((frame.pos / 2) as u16)?.expect_child()?;
                self.bump();
                self.descend(child)?;
            } else {
                // Odd positions visit the cell itself. Table-internal
                // cells are routing only; index-internal cells hold a
                // real entry.
                let i = (frame.pos / 2) as u16;
                self.bump();
                if node.kind().is_index() {
                    return Entry::from_cell(node.cell(i)?).map(Some);
                }
            }
        }
    }

    /// Drains the cursor into a vector.
    pub fn collect_entries(&mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    fn bump(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.pos += 1;
        }
    }

    fn descend(&mut self, page: u32) -> Result<()> {
        ensure!(
            self.stack.len() < MAX_DEPTH,
            "tree deeper than {} levels, page {} likely forms a cycle",
            MAX_DEPTH,
            page
        );
        self.stack.push(Frame { page, pos: 0 });
        Ok(())
    }
}
