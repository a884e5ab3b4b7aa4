//! Structured schedule violations.
//!
//! The schedule checker never returns a bare boolean: every broken contract
//! is reported as a [`ScheduleViolation`] naming the series, the contract,
//! the observed value and the accepted bounds.

use core::fmt;

/// Accepted range for an observed value. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bound {
    /// Inclusive lower bound
    pub min: Option<f64>,
    /// Inclusive upper bound
    pub max: Option<f64>,
}

impl Bound {
    /// Closed range `[min, max]`.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Upper bound only.
    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Exactly one value.
    #[must_use]
    pub const fn exactly(value: f64) -> Self {
        Self::between(value, value)
    }

    /// Check whether `value` falls inside the bound.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "[{min:.4}, {max:.4}]"),
            (None, Some(max)) => write!(f, "<= {max:.4}"),
            (Some(min), None) => write!(f, ">= {min:.4}"),
            (None, None) => write!(f, "any"),
        }
    }
}

/// The contract a series broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contract {
    /// Wrong-interval share too high
    IntervalErrorRate,
    /// First window starts outside tolerance
    StartTime,
    /// Last window ends outside tolerance
    StopTime,
    /// On-time of a window outside tolerance
    WindowOnTime {
        /// Window index
        index: usize,
    },
    /// Off-time between two windows outside tolerance
    WindowOffTime {
        /// Off-period index
        index: usize,
    },
    /// A continuous series was seen in more than one window
    ContinuousWindowCount,
    /// Off-period of an overlapped continuous series not explained by the overlapper
    OverlapResolution {
        /// Off-period index
        index: usize,
    },
    /// No statistics were gathered for the series
    EmptyStatistics,
    /// More than one higher-priority series overlaps this one
    UnsupportedOverlap,
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contract::IntervalErrorRate => write!(f, "interval error rate"),
            Contract::StartTime => write!(f, "start time"),
            Contract::StopTime => write!(f, "stop time"),
            Contract::WindowOnTime { index } => write!(f, "on-time of window {index}"),
            Contract::WindowOffTime { index } => write!(f, "off-time {index}"),
            Contract::ContinuousWindowCount => write!(f, "continuous window count"),
            Contract::OverlapResolution { index } => {
                write!(f, "off-period {index} not caused by a higher-priority series")
            }
            Contract::EmptyStatistics => write!(f, "no advertising observed"),
            Contract::UnsupportedOverlap => write!(f, "more than one overlapping series"),
        }
    }
}

/// One broken schedule contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("series {series}: {contract} observed {observed:.4}, expected {expected}")]
pub struct ScheduleViolation {
    /// Series name
    pub series: String,
    /// Contract that failed
    pub contract: Contract,
    /// Observed value
    pub observed: f64,
    /// Accepted bounds
    pub expected: Bound,
}

impl ScheduleViolation {
    /// Create a violation.
    #[must_use]
    pub fn new(series: impl Into<String>, contract: Contract, observed: f64, expected: Bound) -> Self {
        Self {
            series: series.into(),
            contract,
            observed,
            expected,
        }
    }
}

/// Schedule verdict failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// One or more series broke their schedule
    #[error("{} schedule violation(s): {}", .0.len(), join(.0))]
    Violations(Vec<ScheduleViolation>),
}

impl ScheduleError {
    /// The individual violations.
    pub fn violations(&self) -> &[ScheduleViolation] {
        match self {
            ScheduleError::Violations(v) => v,
        }
    }
}

fn join(violations: &[ScheduleViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_contains() {
        let b = Bound::between(1.0, 2.0);
        assert!(b.contains(1.0));
        assert!(b.contains(2.0));
        assert!(!b.contains(2.1));
        assert!(Bound::at_most(3.0).contains(-10.0));
        assert!(Bound::default().contains(f64::MAX));
    }

    #[test]
    fn test_violation_display() {
        let v = ScheduleViolation::new("B", Contract::StartTime, 31.9, Bound::between(28.5, 31.5));
        assert_eq!(
            v.to_string(),
            "series B: start time observed 31.9000, expected [28.5000, 31.5000]"
        );
    }

    #[test]
    fn test_schedule_error_lists_violations() {
        let err = ScheduleError::Violations(vec![
            ScheduleViolation::new("A", Contract::EmptyStatistics, 0.0, Bound::default()),
            ScheduleViolation::new("C", Contract::IntervalErrorRate, 0.2, Bound::at_most(0.01)),
        ]);
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().starts_with("2 schedule violation(s)"));
    }
}
