//! Fuzz testing for node parsing.
//!
//! This fuzz target interprets arbitrary bytes as a B-Tree page to
//! ensure header parsing, validation, and cell accessors reject corrupt
//! pages with errors instead of panicking or reading out of bounds.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use shaledb::{MemPage, Node};

#[derive(Debug, Arbitrary)]
struct NodeInput {
    page_one: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: NodeInput| {
    if input.data.len() > 4096 {
        return;
    }

    let number = if input.page_one { 1 } else { 2 };
    let page = MemPage::new(number, input.data);
    let Ok(node) = Node::from_page(page) else {
        return;
    };

    let _ = node.validate();
    for i in 0..node.n_cells() {
        let _ = node.cell(i);
        let _ = node.key_of(i);
        let _ = node.cell_bytes(i);
    }
});
