//! Synthetic timestamps and scan transcripts.
//!
//! Timestamps are nanoseconds. Helpers taking seconds or milliseconds convert
//! once and round to the nearest nanosecond so a 20 ms series is exactly
//! 20 ms apart.

use advscope_analysis::{BleAddress, DeviceCapture, PayloadCapture, ScanTranscript};
use advscope_catalog::{PayloadBuilder, PduType, SeriesDefinition, expected_timeline};
use advscope_errors::CatalogError;

/// Address used for the DUT by default.
pub const DUT_ADDRESS: BleAddress = BleAddress([0xC0, 0x4D, 0x3A, 0x10, 0x20, 0x30]);

/// Nanoseconds per millisecond.
pub const MS: u64 = 1_000_000;

/// Nanoseconds per second.
pub const SECOND: u64 = 1_000_000_000;

fn ns(seconds: f64) -> u64 {
    (seconds * 1e9).round().max(0.0) as u64
}

/// `count` timestamps `interval_ms` apart starting at `start_ns`.
pub fn continuous(start_ns: u64, interval_ms: f64, count: usize) -> Vec<u64> {
    let step = interval_ms * 1e6;
    (0..count)
        .map(|i| start_ns + (i as f64 * step).round() as u64)
        .collect()
}

/// Timestamps every `interval_ms` in `[start_s, stop_s)`.
pub fn span(start_s: f64, stop_s: f64, interval_ms: f64) -> Vec<u64> {
    let step_s = interval_ms / 1e3;
    let count = ((stop_s - start_s) / step_s - 1e-9).ceil().max(0.0) as usize;
    continuous(ns(start_s), interval_ms, count)
}

/// Timestamps every `interval_ms` during the on-part of each `(on_s, period_s)`
/// window between `start_s` and `stop_s`.
pub fn duty_cycled(start_s: f64, stop_s: f64, interval_ms: f64, on_s: f64, period_s: f64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut window = start_s;
    while window < stop_s {
        out.extend(span(window, (window + on_s).min(stop_s), interval_ms));
        window += period_s;
    }
    out
}

/// Remove every `n`-th timestamp: those at positions `i` with `i % n == phase`.
pub fn drop_every(timestamps: &[u64], n: usize, phase: usize) -> Vec<u64> {
    timestamps
        .iter()
        .enumerate()
        .filter(|(i, _)| i % n != phase)
        .map(|(_, t)| *t)
        .collect()
}

/// Shift every timestamp by `offset_ns`.
pub fn shifted(timestamps: &[u64], offset_ns: u64) -> Vec<u64> {
    timestamps.iter().map(|t| t + offset_ns).collect()
}

/// One device sending one payload.
pub fn device(address: BleAddress, payload: &[u8], timestamps_ns: Vec<u64>) -> DeviceCapture {
    DeviceCapture {
        address,
        pdu_type: PduType::ConnectableUndirected,
        advertising: vec![PayloadCapture::new(payload.to_vec(), timestamps_ns)],
        scan_responses: vec![],
    }
}

/// Builds a transcript device by device.
#[derive(Debug, Default)]
pub struct TranscriptBuilder {
    devices: Vec<DeviceCapture>,
}

impl TranscriptBuilder {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new device; following payloads go to it.
    pub fn device(mut self, address: BleAddress, pdu_type: PduType) -> Self {
        self.devices.push(DeviceCapture {
            address,
            pdu_type,
            advertising: vec![],
            scan_responses: vec![],
        });
        self
    }

    fn current(&mut self) -> &mut DeviceCapture {
        if self.devices.is_empty() {
            self.devices.push(DeviceCapture {
                address: DUT_ADDRESS,
                pdu_type: PduType::ConnectableUndirected,
                advertising: vec![],
                scan_responses: vec![],
            });
        }
        let last = self.devices.len() - 1;
        &mut self.devices[last]
    }

    /// Add an advertising payload to the current device, merging with an
    /// earlier capture of the same bytes.
    pub fn advertising(mut self, payload: &[u8], timestamps_ns: Vec<u64>) -> Self {
        let device = self.current();
        match device.advertising.iter_mut().find(|c| c.payload == payload) {
            Some(capture) => {
                capture.timestamps_ns.extend(timestamps_ns);
                capture.timestamps_ns.sort_unstable();
            }
            None => device
                .advertising
                .push(PayloadCapture::new(payload.to_vec(), timestamps_ns)),
        }
        self
    }

    /// Add a scan response payload to the current device.
    pub fn scan_response(mut self, payload: &[u8], timestamps_ns: Vec<u64>) -> Self {
        self.current()
            .scan_responses
            .push(PayloadCapture::new(payload.to_vec(), timestamps_ns));
        self
    }

    /// The transcript.
    pub fn build(self) -> ScanTranscript {
        ScanTranscript::new(self.devices)
    }
}

/// A transcript of a DUT advertising `series` perfectly.
///
/// Follows the expected priority timeline up to `horizon_s`, sending each
/// segment's series at its nominal interval, with payloads and scan
/// responses built by `builder`.
///
/// # Errors
///
/// Returns the builder's error for a template it cannot encode.
pub fn ideal_transcript<B: PayloadBuilder>(
    series: &[SeriesDefinition],
    builder: &B,
    horizon_s: Option<f64>,
) -> Result<ScanTranscript, CatalogError> {
    let pdu_type = series.first().map_or(PduType::ConnectableUndirected, |s| s.pdu_type);
    let mut transcript = TranscriptBuilder::new().device(DUT_ADDRESS, pdu_type);
    for segment in expected_timeline(series, horizon_s) {
        let Some(def) = series.get(segment.series) else {
            continue;
        };
        let payload = builder.build(&def.packet_template)?;
        let timestamps = span(segment.start_s, segment.stop_s, def.interval.nominal_ms());
        transcript = transcript.advertising(&payload, timestamps);
    }
    let mut transcript = transcript.build();
    for device in &mut transcript.devices {
        for def in series {
            let response = builder.build(&def.scan_response_template)?;
            if !device.scan_responses.iter().any(|c| c.payload == response) {
                device.scan_responses.push(PayloadCapture::new(response, vec![0]));
            }
        }
    }
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advscope_catalog::{CatalogSeries, DeviceProfile, TemplatePayloadBuilder};

    #[test]
    fn test_span_is_half_open() {
        let ts = span(0.0, 1.0, 20.0);
        assert_eq!(ts.len(), 50);
        assert_eq!(ts.last().copied(), Some(980 * MS));
    }

    #[test]
    fn test_duty_cycled_windows() {
        let ts = duty_cycled(0.0, 15.0, 30.0, 1.28, 5.0);
        // 43 packets per 1.28 s window, three windows
        assert_eq!(ts.len(), 3 * 43);
        assert!(ts.contains(&(5 * SECOND)));
    }

    #[test]
    fn test_drop_every() {
        let ts = continuous(0, 20.0, 10);
        let kept = drop_every(&ts, 5, 4);
        assert_eq!(kept.len(), 8);
        assert!(!kept.contains(&(80 * MS)));
    }

    #[test]
    fn test_builder_merges_payloads() {
        let t = TranscriptBuilder::new()
            .advertising(&[1], vec![20 * MS])
            .advertising(&[2], vec![10 * MS])
            .advertising(&[1], vec![0])
            .build();
        assert_eq!(t.devices.len(), 1);
        assert_eq!(t.devices[0].advertising.len(), 2);
        assert_eq!(t.devices[0].advertising[0].timestamps_ns, vec![0, 20 * MS]);
    }

    #[test]
    fn test_ideal_transcript_sends_every_payload() {
        let series = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
        let t = ideal_transcript(&series, &builder, Some(40.0)).unwrap();
        assert_eq!(t.devices.len(), 1);
        assert!(t.devices[0].packet_count() > 0);
        assert!(!t.devices[0].advertising.is_empty());
    }
}
