//! Series catalog, payload template and AD-structure errors.

use crate::common::ErrorSeverity;

/// Errors raised by catalog lookups, payload building and AD decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Series name is not in the catalog
    #[error("Unknown advertising series: {0}")]
    UnknownSeries(String),

    /// Capability combination has no defined series set
    #[error("No application pairing series defined for {0}")]
    UndefinedPairingConfiguration(String),

    /// Other service data precedes the BLE Pro service data
    #[error(
        "Series {series}: service data {found} precedes the BLE Pro service data in the scan response"
    )]
    IncompatibleServiceDataOrder {
        /// Offending series
        series: String,
        /// Description of the leading service data
        found: String,
    },

    /// Advertising data could not be decoded
    #[error("Malformed advertising data at offset {offset}: {reason}")]
    MalformedAdvertisingData {
        /// Byte offset of the faulty AD structure
        offset: usize,
        /// What went wrong
        reason: String,
    },

    /// A device profile field cannot be encoded
    #[error("Invalid profile field '{field}': {reason}")]
    InvalidProfileField {
        /// Field name
        field: String,
        /// Reason
        reason: String,
    },

    /// Two series with the same template cannot be told apart
    #[error("Series {first} and {second} share a payload, overlap in time and use the same interval")]
    Indistinguishable {
        /// First series name
        first: String,
        /// Second series name
        second: String,
    },

    /// A series appears twice in an expected list
    #[error("Series {0} listed more than once")]
    DuplicateSeries(String),
}

impl CatalogError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CatalogError::MalformedAdvertisingData { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create an unknown-series error.
    #[must_use]
    pub fn unknown_series(name: impl Into<String>) -> Self {
        CatalogError::UnknownSeries(name.into())
    }

    /// Create a malformed-data error.
    #[must_use]
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CatalogError::MalformedAdvertisingData {
            offset,
            reason: reason.into(),
        }
    }

    /// Create an invalid-profile-field error.
    #[must_use]
    pub fn invalid_profile_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidProfileField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an indistinguishable-series error.
    #[must_use]
    pub fn indistinguishable(first: impl Into<String>, second: impl Into<String>) -> Self {
        CatalogError::Indistinguishable {
            first: first.into(),
            second: second.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message() {
        let err = CatalogError::malformed(7, "length exceeds buffer");
        assert_eq!(
            err.to_string(),
            "Malformed advertising data at offset 7: length exceeds buffer"
        );
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_unknown_series() {
        let err = CatalogError::unknown_series("Z");
        assert_eq!(err.to_string(), "Unknown advertising series: Z");
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
