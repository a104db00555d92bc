//! Fuzz testing for the record unpacker.
//!
//! This fuzz target feeds arbitrary byte sequences to Record::unpack to
//! ensure malformed payloads are rejected with errors, never panics.
//! Payloads that do parse must survive a repack round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;

use shaledb::Record;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }

    if let Ok(record) = Record::unpack(data) {
        let repacked = record.pack().expect("a parsed record must repack");
        let reparsed = Record::unpack(&repacked).expect("a repacked record must parse");
        assert_eq!(reparsed.len(), record.len());
        assert_eq!(reparsed.fields(), record.fields());
    }
});
