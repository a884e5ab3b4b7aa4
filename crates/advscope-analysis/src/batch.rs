//! Advertising batches.

use advscope_catalog::PduType;
use serde::Serialize;

use crate::capture::{hex, nanos_to_ms, nanos_to_s};

/// A maximal run of packets from one source with one payload whose gaps fit a single series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    /// Index of the device in the transcript
    pub source: usize,
    /// PDU type of the packets
    pub pdu_type: PduType,
    /// Raw advertising data shared by every packet
    #[serde(serialize_with = "serialize_hex")]
    pub payload: Vec<u8>,
    /// Strictly increasing reception times, nanoseconds
    pub timestamps_ns: Vec<u64>,
    /// Expected series that send this payload, by index
    pub candidates: Vec<usize>,
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex(bytes))
}

impl Batch {
    /// Number of packets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps_ns.len()
    }

    /// Whether the batch holds no packet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps_ns.is_empty()
    }

    /// First reception time.
    #[must_use]
    pub fn first_ns(&self) -> Option<u64> {
        self.timestamps_ns.first().copied()
    }

    /// Last reception time.
    #[must_use]
    pub fn last_ns(&self) -> Option<u64> {
        self.timestamps_ns.last().copied()
    }

    /// Gaps between adjacent packets, milliseconds.
    #[must_use]
    pub fn intervals_ms(&self) -> Vec<f64> {
        self.timestamps_ns
            .windows(2)
            .filter_map(|pair| match pair {
                [a, b] => Some(nanos_to_ms(b.saturating_sub(*a))),
                _ => None,
            })
            .collect()
    }

    /// Start of the batch in seconds after `origin_ns`.
    #[must_use]
    pub fn start_s(&self, origin_ns: u64) -> f64 {
        self.first_ns()
            .map_or(0.0, |t| nanos_to_s(t.saturating_sub(origin_ns)))
    }

    /// End of the batch in seconds after `origin_ns`.
    #[must_use]
    pub fn end_s(&self, origin_ns: u64) -> f64 {
        self.last_ns()
            .map_or(0.0, |t| nanos_to_s(t.saturating_sub(origin_ns)))
    }

    /// Time from first to last packet, seconds.
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        match (self.first_ns(), self.last_ns()) {
            (Some(first), Some(last)) => nanos_to_s(last.saturating_sub(first)),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(timestamps_ns: Vec<u64>) -> Batch {
        Batch {
            source: 0,
            pdu_type: PduType::ConnectableUndirected,
            payload: vec![0x02, 0x01, 0x05],
            timestamps_ns,
            candidates: vec![0],
        }
    }

    #[test]
    fn test_intervals() {
        let b = batch(vec![1_000_000_000, 1_020_000_000, 1_060_000_000]);
        assert_eq!(b.intervals_ms(), vec![20.0, 40.0]);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_times_relative_to_origin() {
        let b = batch(vec![3_000_000_000, 4_500_000_000]);
        assert!((b.start_s(1_000_000_000) - 2.0).abs() < 1e-12);
        assert!((b.end_s(1_000_000_000) - 3.5).abs() < 1e-12);
        assert!((b.duration_s() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_batch() {
        let b = batch(vec![]);
        assert!(b.is_empty());
        assert!(b.intervals_ms().is_empty());
        assert!(b.duration_s().abs() < f64::EPSILON);
    }
}
