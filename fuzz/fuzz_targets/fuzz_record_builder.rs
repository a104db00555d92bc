//! Fuzz testing for the record builder and pack/unpack cycle.
//!
//! This fuzz target builds records from arbitrary append sequences and
//! checks that any record the builder produces either packs cleanly and
//! round-trips, or fails packing with an error (oversized headers),
//! never panicking either way.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use shaledb::{Record, RecordBuilder};

#[derive(Debug, Arbitrary)]
enum AppendOperation {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Text(String),
}

fuzz_target!(|operations: Vec<AppendOperation>| {
    if operations.len() > 300 {
        return;
    }

    let mut builder = RecordBuilder::new();
    for op in &operations {
        builder = match op {
            AppendOperation::Null => builder.append_null(),
            AppendOperation::Int8(v) => builder.append_int8(*v),
            AppendOperation::Int16(v) => builder.append_int16(*v),
            AppendOperation::Int32(v) => builder.append_int32(*v),
            AppendOperation::Text(v) => {
                if v.len() > 1024 {
                    return;
                }
                builder.append_text(v)
            }
        };
    }

    let record = builder.finish();
    assert_eq!(record.len(), operations.len());

    // Records with too many fields for a one-byte header length must
    // fail to pack; everything else must round-trip.
    match record.pack() {
        Ok(raw) => {
            assert_eq!(raw.len(), record.packed_len());
            let reparsed = Record::unpack(&raw).expect("a packed record must parse");
            assert_eq!(reparsed.fields(), record.fields());
        }
        Err(_) => {
            let header_len: usize = 1 + record
                .fields()
                .iter()
                .map(|f| f.header_entry_len())
                .sum::<usize>();
            assert!(header_len > u8::MAX as usize);
        }
    }
});
