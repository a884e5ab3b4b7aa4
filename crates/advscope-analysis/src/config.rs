//! Analysis configuration.
//!
//! Every knob has a default matching the BLE timing rules the catalog was
//! written against, so `AnalysisConfig::default()` is the normal starting
//! point. Configurations are plain serde structs and can be loaded from JSON.

use advscope_errors::{AdvScopeError, ValidationError, validate_range};
use serde::{Deserialize, Serialize};

/// Batch splitting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Packets that may be lost in a row without closing a low duty cycle batch.
    ///
    /// Default: 2 (a gap of three intervals still extends the batch).
    pub ldc_max_missed_packets: u32,

    /// Packets that may be lost in a row without closing a high duty cycle batch.
    ///
    /// Default: 15.
    pub hdc_max_missed_packets: u32,

    /// Minimum records for a batch to be kept.
    ///
    /// Default: 2. A single record carries no interval.
    pub min_batch_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ldc_max_missed_packets: 2,
            hdc_max_missed_packets: 15,
            min_batch_len: 2,
        }
    }
}

impl ParserConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a batch could be kept without any interval.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        if self.min_batch_len < 2 {
            return Err(ValidationError::constraint("min_batch_len must be at least 2").into());
        }
        validate_range!("ldc_max_missed_packets", self.ldc_max_missed_packets, 1, 100);
        validate_range!("hdc_max_missed_packets", self.hdc_max_missed_packets, 1, 100);
        Ok(())
    }
}

/// Good/wrong interval filtering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalFilterConfig {
    /// Relative tolerance around a multiple of the expected interval.
    pub relative_tolerance: f64,
    /// Random advertising delay added by the controller, in milliseconds.
    pub adv_delay_ms: f64,
    /// Largest multiple of a low duty cycle interval still read as packet loss.
    pub ldc_max_multiple: u32,
    /// Half-width of the acceptance window around HDC multiples, in milliseconds.
    pub hdc_window_ms: f64,
    /// Largest multiple of the HDC interval still read as packet loss.
    pub hdc_max_multiple: u32,
    /// Longest run of lost-packet intervals accepted in low duty cycle.
    pub max_consecutive_loss_ldc: usize,
    /// Longest run of lost-packet intervals accepted in high duty cycle.
    pub max_consecutive_loss_hdc: usize,
}

impl Default for IntervalFilterConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: 0.10,
            adv_delay_ms: 0.0,
            ldc_max_multiple: 10,
            hdc_window_ms: 0.5,
            hdc_max_multiple: 16,
            max_consecutive_loss_ldc: 10,
            max_consecutive_loss_hdc: 15,
        }
    }
}

impl IntervalFilterConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or a multiple is zero.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        validate_range!("relative_tolerance", self.relative_tolerance, 0.0, 1.0);
        validate_range!("adv_delay_ms", self.adv_delay_ms, 0.0, 10.0);
        validate_range!("hdc_window_ms", self.hdc_window_ms, 0.0, 3.75);
        validate_range!("ldc_max_multiple", self.ldc_max_multiple, 1, 1000);
        validate_range!("hdc_max_multiple", self.hdc_max_multiple, 1, 1000);
        Ok(())
    }
}

/// Schedule checker tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleTolerances {
    /// Relative tolerance on start, stop and window timings (ε).
    pub series_timing: f64,
    /// Packets that may be lost at a window edge.
    pub window_loss_packets: u32,
    /// Share of wrong intervals a series must stay strictly under.
    pub error_rate: f64,
}

impl Default for ScheduleTolerances {
    fn default() -> Self {
        Self {
            series_timing: 0.05,
            window_loss_packets: 5,
            error_rate: 0.01,
        }
    }
}

impl ScheduleTolerances {
    /// Absolute window-edge tolerance (Δ) for a series with the given nominal interval.
    #[must_use]
    pub fn window_loss_s(&self, nominal_ms: f64) -> f64 {
        f64::from(self.window_loss_packets) * nominal_ms / 1000.0
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a ratio falls outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        validate_range!("series_timing", self.series_timing, 0.0, 1.0);
        validate_range!("error_rate", self.error_rate, 0.0, 1.0);
        Ok(())
    }
}

/// Per-interval assertion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalCheckConfig {
    /// Wrong intervals tolerated per expected interval when every interval is checked.
    pub wrong_interval_tolerance: usize,
    /// Accepted deviation of the mean interval, in milliseconds.
    pub average_tolerance_ms: f64,
}

impl Default for IntervalCheckConfig {
    fn default() -> Self {
        Self {
            wrong_interval_tolerance: 3,
            average_tolerance_ms: 2.88,
        }
    }
}

impl IntervalCheckConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the average tolerance is negative.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        validate_range!("average_tolerance_ms", self.average_tolerance_ms, 0.0, 100.0);
        Ok(())
    }
}

/// Complete analysis configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Batch splitting
    pub parser: ParserConfig,
    /// Interval filtering
    pub filter: IntervalFilterConfig,
    /// Schedule tolerances
    pub schedule: ScheduleTolerances,
    /// Per-interval assertion
    pub interval_check: IntervalCheckConfig,
}

impl AnalysisConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error found.
    pub fn validate(&self) -> Result<(), AdvScopeError> {
        self.parser.validate()?;
        self.filter.validate()?;
        self.schedule.validate()?;
        self.interval_check.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() -> Result<(), AdvScopeError> {
        AnalysisConfig::default().validate()
    }

    #[test]
    fn test_window_loss() {
        let tol = ScheduleTolerances::default();
        assert!((tol.window_loss_s(20.0) - 0.1).abs() < 1e-12);
        assert!((tol.window_loss_s(3.5) - 0.0175).abs() < 1e-12);
    }

    #[test]
    fn test_min_batch_len_rejected() {
        let config = ParserConfig {
            min_batch_len: 1,
            ..ParserConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_tolerance_rejected() {
        let config = IntervalFilterConfig {
            relative_tolerance: f64::NAN,
            ..IntervalFilterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let config: AnalysisConfig = serde_json::from_str(r#"{"filter": {"adv_delay_ms": 10.0}}"#)?;
        assert!((config.filter.adv_delay_ms - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.parser, ParserConfig::default());
        Ok(())
    }
}
