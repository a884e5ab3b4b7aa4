//! Fuzzes batch splitting and the sequence analysis behind it.
//!
//! Input bytes become packets: one byte picks the payload, two more the gap
//! to the previous packet in 0.1 ms steps. Every record must come out
//! batched or discarded, and the analysis must never panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_split_batches
#![no_main]
use advscope_analysis::{
    AdvertisingAnalyzer, BleAddress, DeviceCapture, ParserConfig, PayloadCapture, PayloadIndex, ScanTranscript,
    split_into_batches,
};
use advscope_catalog::{CatalogSeries, PduType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut captures: Vec<PayloadCapture> = (0u8..3).map(|tag| PayloadCapture::new(vec![0x02, 0xFF, tag], vec![])).collect();
    let mut now_ns = 0u64;
    for chunk in data.chunks_exact(3) {
        let [tag, hi, lo] = chunk else { continue };
        now_ns = now_ns.saturating_add(u64::from(u16::from_be_bytes([*hi, *lo])) * 100_000);
        if let Some(capture) = captures.get_mut(usize::from(*tag % 3)) {
            capture.timestamps_ns.push(now_ns);
        }
    }
    let transcript = ScanTranscript::new(vec![DeviceCapture {
        address: BleAddress([0xC0, 0, 0, 0, 0, 1]),
        pdu_type: PduType::ConnectableUndirected,
        advertising: captures,
        scan_responses: vec![],
    }]);

    let series = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::E, CatalogSeries::F]);
    let Some(device) = transcript.devices.first() else { return };
    let index = PayloadIndex::by_first_seen(&series, device);

    let outcome = split_into_batches(&transcript, &index, &ParserConfig::default());
    let batched: usize = outcome.batches.iter().map(|b| b.len()).sum();
    let dropped: usize = outcome.discarded.iter().map(|d| d.count).sum();
    assert_eq!(batched + dropped, transcript.records().len());

    let _ = AdvertisingAnalyzer::default().analyze_sequence(&transcript, &index, Some(60.0));
});
