//! Scan transcripts.
//!
//! A transcript is what a scanner hands back after one scan: for each device
//! seen, its PDU type and every distinct payload with the timestamps at which
//! it was received. Transcripts serialize to JSON so scans can be recorded
//! and replayed offline.

use core::fmt;
use core::str::FromStr;

use advscope_catalog::PduType;
use advscope_errors::ScanError;
use serde::{Deserialize, Serialize};

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: f64 = 1e9;

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: f64 = 1e6;

/// A 6-byte BLE device address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BleAddress(pub [u8; 6]);

impl BleAddress {
    /// The raw bytes.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// The next address, carrying across bytes and wrapping at `FF:FF:FF:FF:FF:FF`.
    ///
    /// Devices that prepair on their current address advertise the pairing
    /// series on this one.
    #[must_use]
    pub fn increment(&self) -> Self {
        let mut bytes = self.0;
        for byte in bytes.iter_mut().rev() {
            let (next, overflow) = byte.overflowing_add(1);
            *byte = next;
            if !overflow {
                break;
            }
        }
        Self(bytes)
    }
}

impl fmt::Display for BleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for BleAddress {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScanError::address_unavailable(format!("invalid BLE address '{s}'"));
        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(':');
        for slot in &mut bytes {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).ok().ok_or_else(invalid)?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

impl Serialize for BleAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BleAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One distinct payload and the times it was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCapture {
    /// Raw advertising data
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
    /// Reception timestamps, nanoseconds
    pub timestamps_ns: Vec<u64>,
}

impl PayloadCapture {
    /// Create a capture.
    #[must_use]
    pub fn new(payload: impl Into<Vec<u8>>, timestamps_ns: Vec<u64>) -> Self {
        Self {
            payload: payload.into(),
            timestamps_ns,
        }
    }
}

/// Everything captured from one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapture {
    /// Device address
    pub address: BleAddress,
    /// PDU type of the advertising
    pub pdu_type: PduType,
    /// Advertising payloads in first-seen order
    #[serde(default)]
    pub advertising: Vec<PayloadCapture>,
    /// Scan response payloads in first-seen order
    #[serde(default)]
    pub scan_responses: Vec<PayloadCapture>,
}

impl DeviceCapture {
    /// Number of advertising packets received.
    #[must_use]
    pub fn packet_count(&self) -> usize {
        self.advertising.iter().map(|c| c.timestamps_ns.len()).sum()
    }
}

/// A single advertising packet, borrowed from a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRecord<'a> {
    /// Index of the device in the transcript
    pub source: usize,
    /// Reception time, nanoseconds
    pub timestamp_ns: u64,
    /// PDU type
    pub pdu_type: PduType,
    /// Raw advertising data
    pub payload: &'a [u8],
}

/// The result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanTranscript {
    /// Devices in the order they were first seen
    pub devices: Vec<DeviceCapture>,
}

impl ScanTranscript {
    /// Create a transcript.
    #[must_use]
    pub fn new(devices: Vec<DeviceCapture>) -> Self {
        Self { devices }
    }

    /// Whether no packet was captured at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.iter().all(|d| d.packet_count() == 0)
    }

    /// Find a device by address.
    #[must_use]
    pub fn device(&self, address: &BleAddress) -> Option<&DeviceCapture> {
        self.devices.iter().find(|d| &d.address == address)
    }

    /// Every advertising record, ordered by timestamp then source.
    #[must_use]
    pub fn records(&self) -> Vec<PacketRecord<'_>> {
        let mut records: Vec<PacketRecord<'_>> = self
            .devices
            .iter()
            .enumerate()
            .flat_map(|(source, device)| {
                device.advertising.iter().flat_map(move |capture| {
                    capture.timestamps_ns.iter().map(move |&timestamp_ns| PacketRecord {
                        source,
                        timestamp_ns,
                        pdu_type: device.pdu_type,
                        payload: &capture.payload,
                    })
                })
            })
            .collect();
        records.sort_by_key(|r| (r.timestamp_ns, r.source));
        records
    }

    /// Earliest and latest advertising timestamps over all devices.
    #[must_use]
    pub fn time_span_ns(&self) -> Option<(u64, u64)> {
        let all = self
            .devices
            .iter()
            .flat_map(|d| d.advertising.iter())
            .flat_map(|c| c.timestamps_ns.iter().copied());
        all.fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }

    /// Time between the first and the last advertising packet, in seconds.
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        self.time_span_ns()
            .map_or(0.0, |(lo, hi)| nanos_to_s(hi.saturating_sub(lo)))
    }
}

/// Convert a nanosecond span to seconds.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "scan spans stay far below 2^52 ns")]
pub fn nanos_to_s(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SECOND
}

/// Convert a nanosecond span to milliseconds.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "scan spans stay far below 2^52 ns")]
pub fn nanos_to_ms(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_MILLI
}

/// Lower-case hex rendering of a payload.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if !s.len().is_multiple_of(2) || !s.is_ascii() {
            return Err(serde::de::Error::custom("payload hex must have an even number of digits"));
        }
        s.as_bytes()
            .chunks(2)
            .map(|pair| {
                core::str::from_utf8(pair)
                    .ok()
                    .and_then(|p| u8::from_str_radix(p, 16).ok())
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid payload hex '{s}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrip() -> Result<(), ScanError> {
        let addr: BleAddress = "C0:FF:EE:00:12:AB".parse()?;
        assert_eq!(addr.octets(), [0xC0, 0xFF, 0xEE, 0x00, 0x12, 0xAB]);
        assert_eq!(addr.to_string(), "C0:FF:EE:00:12:AB");
        Ok(())
    }

    #[test]
    fn test_address_rejects_garbage() {
        assert!("C0:FF:EE".parse::<BleAddress>().is_err());
        assert!("C0:FF:EE:00:12:AB:01".parse::<BleAddress>().is_err());
        assert!("C0:FF:EE:00:12:GG".parse::<BleAddress>().is_err());
    }

    #[test]
    fn test_increment_carries() {
        let addr = BleAddress([0x00, 0x00, 0x00, 0x00, 0x01, 0xFF]);
        assert_eq!(addr.increment(), BleAddress([0, 0, 0, 0, 0x02, 0x00]));
        assert_eq!(BleAddress([0xFF; 6]).increment(), BleAddress([0; 6]));
    }

    #[test]
    fn test_records_are_merged_by_time() {
        let transcript = ScanTranscript::new(vec![
            DeviceCapture {
                address: BleAddress([1; 6]),
                pdu_type: PduType::ConnectableUndirected,
                advertising: vec![PayloadCapture::new(vec![0xAA], vec![10, 30])],
                scan_responses: vec![],
            },
            DeviceCapture {
                address: BleAddress([2; 6]),
                pdu_type: PduType::ConnectableUndirected,
                advertising: vec![PayloadCapture::new(vec![0xBB], vec![10, 20])],
                scan_responses: vec![],
            },
        ]);
        let order: Vec<_> = transcript
            .records()
            .iter()
            .map(|r| (r.timestamp_ns, r.source))
            .collect();
        assert_eq!(order, vec![(10, 0), (10, 1), (20, 1), (30, 0)]);
        assert_eq!(transcript.time_span_ns(), Some((10, 30)));
    }

    #[test]
    fn test_transcript_json() -> Result<(), serde_json::Error> {
        let json = r#"{"devices":[{"address":"01:02:03:04:05:06","pdu_type":"connectable_undirected",
            "advertising":[{"payload":"0201050319c103","timestamps_ns":[0,20000000]}]}]}"#;
        let transcript: ScanTranscript = serde_json::from_str(json)?;
        let device = transcript.devices.first();
        assert_eq!(device.map(|d| d.packet_count()), Some(2));
        assert_eq!(
            device.and_then(|d| d.advertising.first()).map(|c| c.payload.clone()),
            Some(vec![0x02, 0x01, 0x05, 0x03, 0x19, 0xC1, 0x03])
        );
        assert!((transcript.duration_s() - 0.02).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = ScanTranscript::default();
        assert!(transcript.is_empty());
        assert!(transcript.records().is_empty());
        assert!(transcript.duration_s().abs() < f64::EPSILON);
    }
}
