//! Non-fatal findings of the parser and classifier.
//!
//! Neither stage fails on odd input. Anything they had to drop or guess is
//! reported here and left for the caller to weigh.

use core::fmt;

use serde::Serialize;

use crate::capture::hex;

/// Why records were left out of every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// The run was too short to carry an interval
    TooShort,
    /// No expected series sends this payload
    UnknownPayload,
    /// Same source, payload and timestamp as the previous record
    Duplicate,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::TooShort => write!(f, "too short"),
            DiscardReason::UnknownPayload => write!(f, "unknown payload"),
            DiscardReason::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// Records dropped by the parser, grouped by source, payload and reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discarded {
    /// Device index
    pub source: usize,
    /// Payload as lower-case hex
    pub payload: String,
    /// Records dropped
    pub count: usize,
    /// Time of the first dropped record, nanoseconds
    pub first_timestamp_ns: u64,
    /// Why
    pub reason: DiscardReason,
}

impl Discarded {
    pub(crate) fn new(source: usize, payload: &[u8], timestamp_ns: u64, reason: DiscardReason) -> Self {
        Self {
            source,
            payload: hex(payload),
            count: 1,
            first_timestamp_ns: timestamp_ns,
            reason,
        }
    }
}

impl fmt::Display for Discarded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record(s) of {} from source {} dropped: {}",
            self.count, self.payload, self.source, self.reason
        )
    }
}

/// A finding worth reporting next to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Records the parser dropped
    Discarded(Discarded),
    /// A short batch sharing its payload with several series was labeled by default
    AmbiguousLabel {
        /// Batch index
        batch: usize,
        /// Series the batch was given
        chosen: String,
    },
    /// No candidate interval fits the batch
    UnclassifiableBatch {
        /// Batch index
        batch: usize,
        /// Device index
        source: usize,
        /// Rough interval estimate, milliseconds
        rough_ms: f64,
    },
    /// Runs of lost packets too long to be believed were counted as wrong intervals
    LossRunReclassified {
        /// Batch index
        batch: usize,
        /// Number of runs
        runs: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Discarded(d) => write!(f, "{d}"),
            Diagnostic::AmbiguousLabel { batch, chosen } => {
                write!(f, "batch {batch} too short to label, assigned to {chosen}")
            }
            Diagnostic::UnclassifiableBatch {
                batch,
                source,
                rough_ms,
            } => write!(
                f,
                "batch {batch} from source {source} matches no candidate interval ({rough_ms:.3} ms)"
            ),
            Diagnostic::LossRunReclassified { batch, runs } => {
                write!(f, "batch {batch}: {runs} packet-loss run(s) counted as wrong intervals")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discarded_display() {
        let d = Discarded::new(1, &[0xAB, 0x01], 42, DiscardReason::UnknownPayload);
        assert_eq!(d.to_string(), "1 record(s) of ab01 from source 1 dropped: unknown payload");
    }

    #[test]
    fn test_diagnostic_json_tag() -> Result<(), serde_json::Error> {
        let diag = Diagnostic::AmbiguousLabel {
            batch: 3,
            chosen: "A".into(),
        };
        let json = serde_json::to_string(&diag)?;
        assert_eq!(json, r#"{"kind":"ambiguous_label","batch":3,"chosen":"A"}"#);
        Ok(())
    }
}
