//! Failures of the high-level advertising assertions.

/// An advertising assertion did not hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertionFailure {
    /// First device advertised with an unexpected PDU type
    #[error("Expected advertising type {expected}, observed {observed}")]
    WrongPduType {
        /// Expected PDU type
        expected: String,
        /// Observed PDU type
        observed: String,
    },

    /// Advertising lasted too long or too short
    #[error("Advertising lasted {observed_s:.3}s, expected {expected_s}s +/- {tolerance_s}s")]
    DurationOutOfTolerance {
        /// Measured duration
        observed_s: f64,
        /// Expected duration
        expected_s: f64,
        /// Accepted deviation
        tolerance_s: f64,
    },

    /// An expected interval produced no good interval at all
    #[error("No packet observed at the expected interval {interval}")]
    MissingInterval {
        /// Interval label
        interval: String,
    },

    /// Interval statistics outside their specification
    #[error("Interval {interval} out of specification: {detail}")]
    IntervalSpecification {
        /// Interval label
        interval: String,
        /// What was measured
        detail: String,
    },

    /// A batch could not be matched to any expected interval
    #[error("Batch of {payload} from source {source_id} matches no expected interval (rough estimate {rough_ms:.3} ms)")]
    UnclassifiableBatch {
        /// Source index
        source_id: usize,
        /// Payload as hex
        payload: String,
        /// Rough interval estimate
        rough_ms: f64,
    },

    /// Captured payload differs from the built template
    #[error("Packet content mismatch for {group}: {detail}")]
    PacketContentMismatch {
        /// Series group label
        group: String,
        /// First difference found
        detail: String,
    },

    /// Wrong number of devices captured
    #[error("Expected {expected} advertising device(s), found {found}")]
    UnexpectedDeviceCount {
        /// Expected count
        expected: usize,
        /// Found count
        found: usize,
    },

    /// The DUT advertised when it should have stayed silent
    #[error("Device {address} is still advertising ({packets} packet(s) seen)")]
    DeviceStillAdvertising {
        /// Device address
        address: String,
        /// Packets seen
        packets: usize,
    },
}

impl AssertionFailure {
    /// Create a packet-content mismatch.
    #[must_use]
    pub fn content_mismatch(group: impl Into<String>, detail: impl Into<String>) -> Self {
        AssertionFailure::PacketContentMismatch {
            group: group.into(),
            detail: detail.into(),
        }
    }

    /// Create an interval-specification failure.
    #[must_use]
    pub fn interval_spec(interval: impl Into<String>, detail: impl Into<String>) -> Self {
        AssertionFailure::IntervalSpecification {
            interval: interval.into(),
            detail: detail.into(),
        }
    }
}
