//! Fuzzes transcript deserialization as done when replaying a recorded scan.
//!
//! Must never panic; whatever parses must survive a round trip.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_transcript_json
#![no_main]
use advscope_analysis::ScanTranscript;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(transcript) = serde_json::from_slice::<ScanTranscript>(data) else {
        return;
    };
    let _ = transcript.records();
    let _ = transcript.duration_s();
    if let Ok(text) = serde_json::to_string(&transcript) {
        let again: Result<ScanTranscript, _> = serde_json::from_str(&text);
        assert_eq!(again.ok().as_ref(), Some(&transcript));
    }
});
