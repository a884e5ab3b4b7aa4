//! Fuzzes the AD-structure decoder.
//!
//! Whatever decodes must encode back to the same bytes, minus trailing
//! zero padding. Must never panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_ad_structures
#![no_main]
use advscope_catalog::{encode_ad_structures, parse_ad_structures};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = parse_ad_structures(data) {
        if let Ok(encoded) = encode_ad_structures(&records) {
            assert!(data.starts_with(&encoded));
        }
    }
});
