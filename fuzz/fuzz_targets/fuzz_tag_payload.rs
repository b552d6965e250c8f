//! Fuzz target: `extract_record`
//!
//! Arbitrary tag memory dumps must decode or fail cleanly, and padding
//! bytes between pages must not change the outcome.
//!
//! cargo fuzz run fuzz_tag_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine::drivers::nfc::extract_record;

fuzz_target!(|data: &[u8]| {
    let plain = extract_record(data);

    let padded: Vec<u8> = data.iter().flat_map(|b| [*b, 0x00]).collect();
    assert_eq!(extract_record(&padded), plain);
});
