//! Scan timing configuration.

use advscope_errors::{AdvScopeError, ValidationError, validate_range};
use serde::{Deserialize, Serialize};

/// Timing margins around a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Seconds added to the scanner timeout to cover starting the scan and
    /// firing the trigger.
    ///
    /// Default: 4.
    pub scan_trigger_time_s: f64,

    /// Seconds scanned past the expected end of the advertising.
    ///
    /// Default: 2.
    pub extra_scan_time_s: f64,

    /// Requested scan durations must stay strictly below this.
    ///
    /// Default: 3600 (the scanner collaborator times out after an hour).
    pub max_scan_duration_s: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_trigger_time_s: 4.0,
            extra_scan_time_s: 2.0,
            max_scan_duration_s: 3600.0,
        }
    }
}

impl ScanConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a margin is negative or the maximum duration is
    /// not positive.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        validate_range!("scan_trigger_time_s", self.scan_trigger_time_s, 0.0, 60.0);
        validate_range!("extra_scan_time_s", self.extra_scan_time_s, 0.0, 60.0);
        validate_range!("max_scan_duration_s", self.max_scan_duration_s, 0.0, 3600.0);
        if self.max_scan_duration_s <= 0.0 {
            return Err(ValidationError::constraint("max_scan_duration_s must be positive").into());
        }
        Ok(())
    }

    /// Scanner timeout for a scan of `duration_s`.
    #[must_use]
    pub fn timeout_s(&self, duration_s: f64) -> f64 {
        duration_s + self.scan_trigger_time_s
    }
}
