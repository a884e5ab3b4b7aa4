//! Scanner and scan orchestration errors.

use crate::common::ErrorSeverity;

/// Errors raised while scanning or driving the device under test.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// At least one requested address produced no packets
    #[error("No advertising packets received from {}", addresses.join(", "))]
    DeviceNotFound {
        /// Addresses that were requested but never seen
        addresses: Vec<String>,
    },

    /// The scanner collaborator failed
    #[error("Scanner I/O error: {0}")]
    ScannerIo(String),

    /// Requested scan is longer than the scanner accepts
    #[error("Scan duration {requested_s}s must be below {max_s}s")]
    DurationTooLong {
        /// Requested duration in seconds
        requested_s: f64,
        /// Exclusive upper bound in seconds
        max_s: f64,
    },

    /// The DUT address could not be determined
    #[error("DUT address unavailable: {0}")]
    AddressUnavailable(String),

    /// Firing the DUT trigger failed
    #[error("Trigger '{kind}' failed: {reason}")]
    TriggerFailed {
        /// Trigger kind
        kind: String,
        /// Failure reason
        reason: String,
    },
}

impl ScanError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScanError::DeviceNotFound { .. } => ErrorSeverity::Warning,
            ScanError::DurationTooLong { .. } => ErrorSeverity::Error,
            ScanError::TriggerFailed { .. } => ErrorSeverity::Error,
            ScanError::ScannerIo(_) | ScanError::AddressUnavailable(_) => ErrorSeverity::Critical,
        }
    }

    /// Check whether this error reports an unseen device.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, ScanError::DeviceNotFound { .. })
    }

    /// Create a device-not-found error.
    #[must_use]
    pub fn device_not_found(addresses: Vec<String>) -> Self {
        ScanError::DeviceNotFound { addresses }
    }

    /// Create a scanner I/O error.
    #[must_use]
    pub fn scanner_io(msg: impl Into<String>) -> Self {
        ScanError::ScannerIo(msg.into())
    }

    /// Create a duration-too-long error.
    #[must_use]
    pub fn duration_too_long(requested_s: f64, max_s: f64) -> Self {
        ScanError::DurationTooLong { requested_s, max_s }
    }

    /// Create an address-unavailable error.
    #[must_use]
    pub fn address_unavailable(msg: impl Into<String>) -> Self {
        ScanError::AddressUnavailable(msg.into())
    }

    /// Create a trigger failure.
    #[must_use]
    pub fn trigger_failed(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::TriggerFailed {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_lists_addresses() {
        let err = ScanError::device_not_found(vec![
            "11:22:33:44:55:66".to_string(),
            "11:22:33:44:55:67".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "No advertising packets received from 11:22:33:44:55:66, 11:22:33:44:55:67"
        );
        assert!(err.is_device_not_found());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_duration_too_long() {
        let err = ScanError::duration_too_long(4000.0, 3600.0);
        assert!(err.to_string().contains("4000"));
        assert!(!err.is_device_not_found());
    }

    #[test]
    fn test_scanner_io_is_critical() {
        assert_eq!(
            ScanError::scanner_io("dongle gone").severity(),
            ErrorSeverity::Critical
        );
    }
}
