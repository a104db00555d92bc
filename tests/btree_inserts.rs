//! # Insert and Lookup Test Suite
//!
//! End-to-end coverage of table and index trees under multi-level
//! growth: insertion orders that force leaf splits, internal splits,
//! and root growth, plus persistence across reopen and full-tree scans
//! through cursors.
//!
//! ## Test Categories
//!
//! 1. **Small Trees**: A handful of rows in a single leaf
//! 2. **Split Workloads**: Ascending, descending, interleaved volume
//! 3. **Index Trees**: Duplicate keys and multi-level index growth
//! 4. **Persistence**: Trees surviving close and reopen
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test btree_inserts
//! ```

use tempfile::tempdir;

use shaledb::{BTree, Entry, PageKind};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn open_db(dir: &tempfile::TempDir) -> BTree {
    BTree::open(dir.path().join("test.db")).expect("Failed to open database")
}

/// Payload for `key`: a recognizable prefix padded out to 64, 128, or
/// 192 bytes depending on the key, so splits see mixed cell sizes.
fn payload_for(key: u32) -> Vec<u8> {
    let mut payload = format!("row-{:06}", key).into_bytes();
    payload.resize((((key % 3) + 1) * 64) as usize, b'.');
    payload
}

fn assert_all_present(tree: &mut BTree, root: u32, keys: impl Iterator<Item = u32>) {
    for key in keys {
        let found = tree
            .find(root, key)
            .expect("find failed")
            .unwrap_or_else(|| panic!("key {} missing", key));
        assert_eq!(found, payload_for(key), "payload mismatch for key {}", key);
    }
}

fn scan_keys(tree: &mut BTree, root: u32) -> Vec<u32> {
    tree.cursor(root)
        .expect("cursor failed")
        .collect_entries()
        .expect("scan failed")
        .iter()
        .map(Entry::key)
        .collect()
}

// ============================================================================
// SMALL TREE TESTS
// ============================================================================

mod small_tree_tests {
    use super::*;

    #[test]
    fn three_rows_in_one_leaf() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        for key in [4u32, 9, 6000] {
            tree.insert_in_table(1, key, &payload_for(key))
                .expect("insert failed");
        }
        assert_all_present(&mut tree, 1, [4u32, 9, 6000].into_iter());
        assert_eq!(tree.find(1, 5).expect("find failed"), None);
        assert_eq!(tree.find(1, 5999).expect("find failed"), None);
        assert_eq!(tree.pager().page_count(), 1, "three rows must not split");
        assert_eq!(scan_keys(&mut tree, 1), vec![4, 9, 6000]);
    }

    #[test]
    fn duplicate_insert_leaves_the_tree_intact() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        for key in 0..10u32 {
            tree.insert_in_table(1, key, &payload_for(key))
                .expect("insert failed");
        }
        let err = tree.insert_in_table(1, 6, b"shadow").expect_err("must fail");
        assert!(err.to_string().contains("key 6 already exists in table"));
        assert_all_present(&mut tree, 1, 0..10);
    }
}

// ============================================================================
// SPLIT WORKLOAD TESTS
// ============================================================================

mod split_tests {
    use super::*;

    fn run_workload(keys: Vec<u32>) {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        let count = keys.len() as u32;
        for &key in &keys {
            tree.insert_in_table(1, key, &payload_for(key))
                .expect("insert failed");
        }
        assert_all_present(&mut tree, 1, 0..count);
        let scanned = scan_keys(&mut tree, 1);
        assert_eq!(scanned.len(), count as usize);
        assert_eq!(scanned, (0..count).collect::<Vec<_>>());
        // Every page written so far must still be a well-formed node.
        for number in 1..=tree.pager().page_count() {
            tree.get_node(number)
                .expect("node must parse")
                .validate()
                .expect("node must validate");
        }
        let root = tree.get_node(1).expect("root must parse");
        assert_eq!(root.kind(), PageKind::TableInternal, "root must have grown");
    }

    #[test]
    fn ascending_inserts() {
        run_workload((0..400).collect());
    }

    #[test]
    fn descending_inserts() {
        run_workload((0..400).rev().collect());
    }

    #[test]
    fn interleaved_inserts() {
        let mut keys: Vec<u32> = (0..400).step_by(2).collect();
        keys.extend((1..400).step_by(2));
        run_workload(keys);
    }

    #[test]
    fn three_level_table_tree() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        let payload = [0x7Eu8; 64];
        for key in 0..1500u32 {
            tree.insert_in_table(1, key, &payload).expect("insert failed");
        }
        // Root, its internal children, then leaves.
        let root = tree.get_node(1).expect("root must parse");
        assert_eq!(root.kind(), PageKind::TableInternal);
        let first_child = root
            .cell(0)
            .expect("root cell")
            .child()
            .expect("routing cell must carry a child");
        assert_eq!(
            tree.get_node(first_child).expect("child must parse").kind(),
            PageKind::TableInternal,
            "1500 rows must push the tree to three levels"
        );
        for key in (0..1500u32).step_by(97) {
            assert_eq!(
                tree.find(1, key).expect("find failed").as_deref(),
                Some(&payload[..])
            );
        }
        assert_eq!(scan_keys(&mut tree, 1).len(), 1500);
    }
}

// ============================================================================
// INDEX TREE TESTS
// ============================================================================

mod index_tests {
    use super::*;

    #[test]
    fn duplicate_keys_stay_adjacent_in_scans() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        let root = tree
            .new_node(PageKind::IndexLeaf)
            .expect("new node failed")
            .number();
        for round in 0..2u32 {
            for key in 0..150u32 {
                tree.insert_in_index(root, key, key * 10 + round)
                    .expect("insert failed");
            }
        }
        let entries = tree
            .cursor(root)
            .expect("cursor failed")
            .collect_entries()
            .expect("scan failed");
        assert_eq!(entries.len(), 300);
        let keys: Vec<u32> = entries.iter().map(Entry::key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted, "index scan must be non-decreasing");
        for pair in keys.chunks(2) {
            assert_eq!(pair[0], pair[1], "each key appears twice, adjacent");
        }
    }

    #[test]
    fn multi_level_index_tree_scans_completely() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        let root = tree
            .new_node(PageKind::IndexLeaf)
            .expect("new node failed")
            .number();
        for key in 0..4000u32 {
            tree.insert_in_index(root, key, 100_000 + key)
                .expect("insert failed");
        }
        let root_node = tree.get_node(root).expect("root must parse");
        assert_eq!(root_node.kind(), PageKind::IndexInternal);
        let first_child = root_node
            .cell(0)
            .expect("root cell")
            .child()
            .expect("routing cell must carry a child");
        assert_eq!(
            tree.get_node(first_child).expect("child must parse").kind(),
            PageKind::IndexInternal,
            "4000 entries must push the index to three levels"
        );
        let entries = tree
            .cursor(root)
            .expect("cursor failed")
            .collect_entries()
            .expect("scan failed");
        assert_eq!(entries.len(), 4000);
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Entry::Index { key, primary_key } => {
                    assert_eq!(*key, i as u32);
                    assert_eq!(*primary_key, 100_000 + i as u32);
                }
                Entry::Table { .. } => panic!("table entry in an index scan"),
            }
        }
    }

    #[test]
    fn table_and_index_trees_share_one_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut tree = open_db(&dir);
        let index_root = tree
            .new_node(PageKind::IndexLeaf)
            .expect("new node failed")
            .number();
        for key in 0..80u32 {
            tree.insert_in_table(1, key, &payload_for(key))
                .expect("table insert failed");
            tree.insert_in_index(index_root, key % 7, key)
                .expect("index insert failed");
        }
        assert_all_present(&mut tree, 1, 0..80);
        let index_keys = scan_keys(&mut tree, index_root);
        assert_eq!(index_keys.len(), 80);
        assert!(index_keys.windows(2).all(|w| w[0] <= w[1]));
    }
}

// ============================================================================
// PERSISTENCE TESTS
// ============================================================================

mod persistence_tests {
    use super::*;

    #[test]
    fn a_split_tree_survives_reopen() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        {
            let mut tree = BTree::open(&path).expect("Failed to open database");
            for key in 0..300u32 {
                tree.insert_in_table(1, key, &payload_for(key))
                    .expect("insert failed");
            }
            tree.close().expect("Failed to close database");
        }
        let mut tree = BTree::open(&path).expect("Failed to reopen database");
        assert_all_present(&mut tree, 1, 0..300);
        assert_eq!(scan_keys(&mut tree, 1), (0..300).collect::<Vec<_>>());
    }

    #[test]
    fn secondary_roots_survive_reopen() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        let index_root;
        {
            let mut tree = BTree::open(&path).expect("Failed to open database");
            index_root = tree
                .new_node(PageKind::IndexLeaf)
                .expect("new node failed")
                .number();
            for key in 0..200u32 {
                tree.insert_in_index(index_root, key, key + 1)
                    .expect("insert failed");
            }
            tree.close().expect("Failed to close database");
        }
        let mut tree = BTree::open(&path).expect("Failed to reopen database");
        let keys = scan_keys(&mut tree, index_root);
        assert_eq!(keys, (0..200).collect::<Vec<_>>());
    }
}
