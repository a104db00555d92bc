//! The B-Tree engine: opening a database file, key lookup, and node
//! splitting insertion over table and index trees.

use std::path::Path;

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use eyre::{bail, ensure, Result, WrapErr};
use tracing::debug;

use crate::btree::cell::Cell;
use crate::btree::node::{Node, PageKind};
use crate::config::{DEFAULT_PAGE_SIZE, FILE_HEADER_SIZE};
use crate::storage::{FileHeader, MemPage, Pager};

/// Hard cap on descent depth. A well-formed file never gets anywhere
/// near this; hitting it means a page cycle.
pub(crate) const MAX_DEPTH: usize = 64;

/// A disk-backed forest of B-Trees sharing one paged file.
///
/// Page 1 always holds a table tree root created when the file is
/// formatted. Further trees are rooted wherever [`BTree::new_node`]
/// places them. Root pages never move: when a root fills up its cells
/// migrate to a fresh page and the root is rewritten in place as an
/// internal node, so callers can hold on to root page numbers across
/// any number of inserts.
#[derive(Debug)]
pub struct BTree {
    pager: Pager,
}

impl BTree {
    /// Opens a database file, formatting it if it is empty.
    ///
    /// A non-empty file must start with a valid 100-byte header or this
    /// fails with a corrupt-header error.
    pub fn open(path: impl AsRef<Path>) -> Result<BTree> {
        let mut pager = Pager::open(path)?;
        if pager.file_len()? == 0 {
            pager.set_page_size(DEFAULT_PAGE_SIZE)?;
            let number = pager.allocate_page();
            let mut page = MemPage::zeroed(number, DEFAULT_PAGE_SIZE);
            FileHeader::new(DEFAULT_PAGE_SIZE as u16).write_to(&mut page.data)?;
            let root = Node::init(page, PageKind::TableLeaf)?;
            pager.write_page(root.page())?;
            debug!(path = %pager.path().display(), "formatted fresh database file");
        } else {
            let raw = pager
                .read_header()
                .wrap_err("corrupt file header")?;
            let header = FileHeader::from_bytes(&raw).wrap_err("corrupt file header")?;
            header.validate().wrap_err("corrupt file header")?;
            let page_size = header.page_size() as usize;
            ensure!(page_size > 0, "corrupt file header: page size is zero");
            pager.set_page_size(page_size)?;
        }
        Ok(BTree { pager })
    }

    /// Flushes and closes the underlying file.
    pub fn close(self) -> Result<()> {
        self.pager.close()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Reads page `number` and parses it as a node.
    pub fn get_node(&mut self, number: u32) -> Result<Node> {
        let page = self.pager.read_page(number)?;
        Node::from_page(page)
    }

    /// Allocates a fresh page, formats it as an empty node of `kind`,
    /// and writes it out. The node's page number is the root handle for
    /// a new tree.
    pub fn new_node(&mut self, kind: PageKind) -> Result<Node> {
        let number = self.pager.allocate_page();
        let mut node = Node::init(MemPage::zeroed(number, self.pager.page_size()), kind)?;
        self.write_node(&mut node)?;
        debug!(page = number, ?kind, "allocated node");
        Ok(node)
    }

    /// Writes `node` back to its page.
    pub fn write_node(&mut self, node: &mut Node) -> Result<()> {
        node.flush_header()?;
        self.pager.write_page(node.page())
    }

    /// Looks up `key` in the table rooted at `root` and returns its
    /// packed payload, or `None` if the key is absent.
    pub fn find(&mut self, root: u32, key: u32) -> Result<Option<Vec<u8>>> {
        self.find_at(root, key, 0)
    }

    fn find_at(&mut self, page: u32, key: u32, depth: usize) -> Result<Option<Vec<u8>>> {
        ensure!(
            depth < MAX_DEPTH,
            "tree deeper than {} levels, page {} likely forms a cycle",
            MAX_DEPTH,
            page
        );
        let node = self.get_node(page)?;
        ensure!(
            node.kind().is_table(),
            "page {} is not part of a table tree",
            page
        );
        if node.kind().is_leaf() {
            for i in 0..node.n_cells() {
                let k = node.key_of(i)?;
                if k > key {
                    break;
                }
                if k == key {
                    match node.cell(i)? {
                        Cell::TableLeaf { payload, .. } => return Ok(Some(payload)),
                        other => bail!("table leaf {} holds a {:?} cell", page, other.kind()),
                    }
                }
            }
            Ok(None)
        } else {
            let (_, child) = self.route(&node, key)?;
            self.find_at(child, key, depth + 1)
        }
    }

    /// Inserts `key` with `payload` into the table rooted at `root`.
    /// Fails if the key is already present.
    pub fn insert_in_table(&mut self, root: u32, key: u32, payload: &[u8]) -> Result<()> {
        self.insert(
            root,
            Cell::TableLeaf {
                key,
                payload: payload.to_vec(),
            },
        )
    }

    /// Inserts an entry mapping `key` to `primary_key` into the index
    /// rooted at `root`. Duplicate keys are allowed.
    pub fn insert_in_index(&mut self, root: u32, key: u32, primary_key: u32) -> Result<()> {
        self.insert(root, Cell::IndexLeaf { key, primary_key })
    }

    /// Inserts a leaf cell into the tree rooted at `root`, splitting
    /// nodes on the way down as needed.
    ///
    /// A cell too large for any page is rejected up front. A
    /// near-capacity cell that passes that check can still fail with a
    /// node-full error once it must share a leaf with existing cells;
    /// splits performed on the way down stay in place and the tree
    /// remains valid, the row is simply not inserted.
    pub fn insert(&mut self, root: u32, cell: Cell) -> Result<()> {
        ensure!(
            cell.kind().is_leaf(),
            "only leaf cells can be inserted, not {:?}",
            cell.kind()
        );
        let node = self.get_node(root)?;
        ensure!(
            node.kind().is_table() == cell.kind().is_table(),
            "cannot insert a {:?} cell into a tree of {:?} nodes",
            cell.kind(),
            node.kind()
        );
        // The worst case is a root leaf on page 1, which loses 100 bytes
        // to the file header.
        let capacity = self.page_size() - FILE_HEADER_SIZE - cell.kind().header_size() - 2;
        ensure!(
            cell.size() <= capacity,
            "cell of {} bytes too large for {}-byte pages",
            cell.size(),
            self.page_size()
        );
        if self.node_is_full(&node, &cell) {
            drop(node);
            self.grow_root(root)?;
        }
        self.insert_non_full(root, cell, 0)
    }

    /// Whether `node` cannot take the thing that would be inserted into
    /// it on this descent: the cell itself for a leaf, a divider of the
    /// tree's class for an internal node.
    fn node_is_full(&self, node: &Node, cell: &Cell) -> bool {
        let incoming = if node.kind().is_leaf() {
            cell.size()
        } else {
            cell.divider(0).size()
        };
        !node.has_room_for(incoming)
    }

    /// Descends from `page`, splitting any full child before stepping
    /// into it, and inserts `cell` at its leaf position. `page` itself
    /// is guaranteed non-full by the caller.
    fn insert_non_full(&mut self, page: u32, cell: Cell, depth: usize) -> Result<()> {
        ensure!(
            depth < MAX_DEPTH,
            "tree deeper than {} levels, page {} likely forms a cycle",
            MAX_DEPTH,
            page
        );
        let mut node = self.get_node(page)?;
        if node.kind().is_leaf() {
            let pos = leaf_insert_pos(&node, &cell)?;
            node.insert_cell(pos, &cell)?;
            return self.write_node(&mut node);
        }
        let (pos, child) = self.route(&node, cell.key())?;
        let child_node = self.get_node(child)?;
        let target = if self.node_is_full(&child_node, &cell) {
            drop(child_node);
            let divider = self.split_child(&mut node, pos, child)?;
            let go_left = if node.kind().is_table() {
                cell.key() <= divider.key()
            } else {
                cell.key() < divider.key()
            };
            if go_left {
                divider.expect_child()?
            } else {
                child
            }
        } else {
            child
        };
        self.insert_non_full(target, cell, depth + 1)
    }

    /// Picks the child of internal `node` that covers `key`. Returns the
    /// routing cell's position (the right page maps to the cell count).
    fn route(&self, node: &Node, key: u32) -> Result<(u16, u32)> {
        for i in 0..node.n_cells() {
            let k = node.key_of(i)?;
            let covers = if node.kind().is_table() {
                key <= k
            } else {
                key < k
            };
            if covers {
                let child = node.cell(i)?.expect_child()?;
                return Ok((i, child));
            }
        }
        ensure!(
            node.right_page() != 0,
            "internal node {} missing right child",
            node.number()
        );
        Ok((node.n_cells(), node.right_page()))
    }

    /// Splits the full child at `parent` position `pos` into itself and
    /// a fresh left sibling, and inserts the divider cell into `parent`.
    /// The sibling takes the lower half of the cells; the divider key is
    /// the median. Returns the divider.
    fn split_child(&mut self, parent: &mut Node, pos: u16, child_no: u32) -> Result<Cell> {
        let child = self.get_node(child_no)?;
        let kind = child.kind();
        let n = child.n_cells();
        ensure!(n > 0, "cannot split empty node {}", child_no);
        let mid = n / 2;
        let median = child.cell(mid)?;
        let child_right = child.right_page();

        // Cell images survive the reinit of the child's page in a bump
        // arena, so both halves can be refilled from raw bytes.
        let arena = Bump::new();
        let mut images = BumpVec::with_capacity_in(n as usize, &arena);
        for i in 0..n {
            images.push(arena.alloc_slice_copy(child.cell_bytes(i)?) as &[u8]);
        }

        let mut sibling = self.new_node(kind)?;
        // A table leaf keeps its median in the lower half and only
        // copies the key up; every other kind moves the median up.
        let sibling_take = if kind == PageKind::TableLeaf {
            mid + 1
        } else {
            mid
        };
        for (i, image) in images[..sibling_take as usize].iter().enumerate() {
            sibling.insert_cell_raw(i as u16, image)?;
        }
        if kind.is_internal() {
            sibling.set_right_page(median.expect_child()?)?;
        }

        let mut child = Node::init(child.into_page(), kind)?;
        for (i, image) in images[mid as usize + 1..].iter().enumerate() {
            child.insert_cell_raw(i as u16, image)?;
        }
        if kind.is_internal() {
            child.set_right_page(child_right)?;
        }

        let divider = median.divider(sibling.number());
        parent.insert_cell(pos, &divider)?;
        self.write_node(&mut sibling)?;
        self.write_node(&mut child)?;
        self.write_node(parent)?;
        debug!(
            parent = parent.number(),
            child = child.number(),
            sibling = sibling.number(),
            key = divider.key(),
            "split child"
        );
        Ok(divider)
    }

    /// Splits a full root without moving it: the root's cells migrate to
    /// a fresh clone page, and the root is reformatted in place as an
    /// internal node whose right child is the clone.
    fn grow_root(&mut self, root: u32) -> Result<()> {
        let old = self.get_node(root)?;
        let kind = old.kind();
        let n = old.n_cells();
        let old_right = old.right_page();

        let mut clone = self.new_node(kind)?;
        for i in 0..n {
            clone.insert_cell_raw(i, old.cell_bytes(i)?)?;
        }
        if kind.is_internal() {
            clone.set_right_page(old_right)?;
        }
        self.write_node(&mut clone)?;

        let mut new_root = Node::init(old.into_page(), kind.internal_kind())?;
        new_root.set_right_page(clone.number())?;
        self.write_node(&mut new_root)?;
        debug!(root, clone = clone.number(), "grew root");
        Ok(())
    }

    /// Renders the tree rooted at `root` as an indented listing, one
    /// line per node and cell. Meant for debugging and tests.
    pub fn dump(&mut self, root: u32) -> Result<String> {
        let mut out = String::new();
        self.dump_into(root, 0, &mut out)?;
        Ok(out)
    }

    fn dump_into(&mut self, page: u32, depth: usize, out: &mut String) -> Result<()> {
        ensure!(
            depth < MAX_DEPTH,
            "tree deeper than {} levels, page {} likely forms a cycle",
            MAX_DEPTH,
            page
        );
        let node = self.get_node(page)?;
        let pad = "  ".repeat(depth);
        out.push_str(&format!(
            "{}page {} {:?} ({} cells)\n",
            pad,
            page,
            node.kind(),
            node.n_cells()
        ));
        for i in 0..node.n_cells() {
            match node.cell(i)? {
                Cell::TableInternal { key, child } => {
                    out.push_str(&format!("{}  key <= {} -> page {}\n", pad, key, child));
                    self.dump_into(child, depth + 1, out)?;
                }
                Cell::TableLeaf { key, payload } => {
                    out.push_str(&format!("{}  key {}: {} bytes\n", pad, key, payload.len()));
                }
                Cell::IndexInternal {
                    key,
                    primary_key,
                    child,
                } => {
                    out.push_str(&format!(
                        "{}  key < {} -> page {}, then {} -> pk {}\n",
                        pad, key, child, key, primary_key
                    ));
                    self.dump_into(child, depth + 1, out)?;
                }
                Cell::IndexLeaf { key, primary_key } => {
                    out.push_str(&format!("{}  key {} -> pk {}\n", pad, key, primary_key));
                }
            }
        }
        if node.kind().is_internal() {
            out.push_str(&format!("{}  right -> page {}\n", pad, node.right_page()));
            self.dump_into(node.right_page(), depth + 1, out)?;
        }
        Ok(())
    }
}

/// Position where `cell` slots into leaf `node`: after any equal keys
/// for an index, or failing with a duplicate-key error for a table.
fn leaf_insert_pos(node: &Node, cell: &Cell) -> Result<u16> {
    let key = cell.key();
    for i in 0..node.n_cells() {
        let k = node.key_of(i)?;
        if node.kind().is_table() && k == key {
            bail!("key {} already exists in table", key);
        }
        if k > key {
            return Ok(i);
        }
    }
    Ok(node.n_cells())
}
