//! Core advertising types: PDU type, interval and window shape.

use core::fmt;
use core::str::FromStr;

use advscope_errors::CatalogError;
use serde::{Deserialize, Serialize};

/// Nominal high-duty-cycle interval, used for label selection and window-loss tolerance.
pub const HDC_NOMINAL_INTERVAL_MS: f64 = 3.5;

/// Longest legal high-duty-cycle interval, used for batch gaps and interval filtering.
pub const HDC_MAX_INTERVAL_MS: f64 = 3.75;

/// Longest a high-duty-cycle burst may last.
pub const HDC_MAX_DURATION_S: f64 = 1.28;

/// Advertising PDU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PduType {
    /// ADV_IND
    ConnectableUndirected,
    /// ADV_DIRECT_IND
    ConnectableDirected,
    /// ADV_SCAN_IND
    ScannableUndirected,
    /// ADV_NONCONN_IND
    NonConnectableUndirected,
}

impl PduType {
    /// All PDU types in specification order.
    pub const ALL: [PduType; 4] = [
        PduType::ConnectableUndirected,
        PduType::ConnectableDirected,
        PduType::ScannableUndirected,
        PduType::NonConnectableUndirected,
    ];

    /// Directed PDUs carry no advertising data.
    #[must_use]
    pub const fn carries_data(self) -> bool {
        !matches!(self, PduType::ConnectableDirected)
    }
}

impl fmt::Display for PduType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PduType::ConnectableUndirected => write!(f, "connectable-undirected"),
            PduType::ConnectableDirected => write!(f, "connectable-directed"),
            PduType::ScannableUndirected => write!(f, "scannable-undirected"),
            PduType::NonConnectableUndirected => write!(f, "non-connectable-undirected"),
        }
    }
}

impl FromStr for PduType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PduType::ALL
            .into_iter()
            .find(|t| t.to_string() == s)
            .ok_or_else(|| CatalogError::invalid_profile_field("pdu_type", format!("unknown PDU type '{s}'")))
    }
}

/// Advertising interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvertisingInterval {
    /// Directed high-duty-cycle advertising (at most 3.75 ms between packets)
    HighDutyCycle,
    /// Fixed interval in milliseconds
    Millis(f64),
}

impl AdvertisingInterval {
    /// 20 ms
    pub const EXTRA_SHORT: Self = AdvertisingInterval::Millis(20.0);
    /// 30 ms
    pub const SHORT: Self = AdvertisingInterval::Millis(30.0);
    /// 100 ms
    pub const LONG: Self = AdvertisingInterval::Millis(100.0);

    /// Interval used to pick a label and to size the window-loss tolerance.
    #[must_use]
    pub const fn nominal_ms(self) -> f64 {
        match self {
            AdvertisingInterval::HighDutyCycle => HDC_NOMINAL_INTERVAL_MS,
            AdvertisingInterval::Millis(ms) => ms,
        }
    }

    /// Interval used for gap sizing and filtering.
    #[must_use]
    pub const fn period_ms(self) -> f64 {
        match self {
            AdvertisingInterval::HighDutyCycle => HDC_MAX_INTERVAL_MS,
            AdvertisingInterval::Millis(ms) => ms,
        }
    }

    /// Whether this is the high-duty-cycle branch.
    #[must_use]
    pub const fn is_high_duty_cycle(self) -> bool {
        matches!(self, AdvertisingInterval::HighDutyCycle)
    }
}

impl fmt::Display for AdvertisingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvertisingInterval::HighDutyCycle => write!(f, "HDC"),
            AdvertisingInterval::Millis(ms) => write!(f, "{ms} ms"),
        }
    }
}

/// Shape of the advertising windows inside a series lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// One window for the whole lifetime
    Continuous,
    /// `on_s` seconds of advertising every `period_s` seconds
    DutyCycle {
        /// Active part of each period
        on_s: f64,
        /// Repetition length
        period_s: f64,
    },
}

impl Window {
    /// Alternating 2 s on / 2 s off, for interlaced series.
    pub const INTERLACED_ALTERNATING: Self = Window::DutyCycle {
        on_s: 2.0,
        period_s: 4.0,
    };
    /// Prepairing bursts.
    pub const PREPARING: Self = Window::DutyCycle {
        on_s: 1.28,
        period_s: 6.28,
    };
    /// Back-to-back high-duty-cycle bursts.
    pub const RECONNECTION_HIGH_DUTY_CYCLE: Self = Window::DutyCycle {
        on_s: 1.28,
        period_s: 1.28,
    };
    /// Long bootloader window.
    pub const BOOTLOADER_ALTERNATING_LONG: Self = Window::DutyCycle {
        on_s: 15.0,
        period_s: 16.0,
    };
    /// Short bootloader window.
    pub const BOOTLOADER_ALTERNATING_SHORT: Self = Window::DutyCycle {
        on_s: 1.0,
        period_s: 16.0,
    };

    /// Active time per period, `None` for continuous.
    #[must_use]
    pub const fn on_s(self) -> Option<f64> {
        match self {
            Window::Continuous => None,
            Window::DutyCycle { on_s, .. } => Some(on_s),
        }
    }

    /// Silent time per period; continuous series have none.
    #[must_use]
    pub fn off_s(self) -> f64 {
        match self {
            Window::Continuous => 0.0,
            Window::DutyCycle { on_s, period_s } => period_s - on_s,
        }
    }

    /// Repetition length; continuous counts as 0.
    #[must_use]
    pub const fn repetition_s(self) -> f64 {
        match self {
            Window::Continuous => 0.0,
            Window::DutyCycle { period_s, .. } => period_s,
        }
    }

    /// Whether this window shape is duty-cycled.
    #[must_use]
    pub const fn is_duty_cycled(self) -> bool {
        matches!(self, Window::DutyCycle { .. })
    }

    /// Whether the window is on `offset_s` seconds after the series start.
    #[must_use]
    pub fn is_on_at(self, offset_s: f64) -> bool {
        match self {
            Window::Continuous => offset_s >= 0.0,
            Window::DutyCycle { on_s, period_s } => {
                offset_s >= 0.0 && period_s > 0.0 && offset_s.rem_euclid(period_s) < on_s
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Continuous => write!(f, "continuous"),
            Window::DutyCycle { on_s, period_s } => write!(f, "{on_s}s every {period_s}s"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdc_intervals() {
        let hdc = AdvertisingInterval::HighDutyCycle;
        assert!((hdc.nominal_ms() - 3.5).abs() < f64::EPSILON);
        assert!((hdc.period_ms() - 3.75).abs() < f64::EPSILON);
        assert!((AdvertisingInterval::SHORT.period_ms() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_window_arithmetic() {
        let w = Window::PREPARING;
        assert!((w.off_s() - 5.0).abs() < 1e-9);
        assert!((w.repetition_s() - 6.28).abs() < 1e-9);
        assert!(w.is_on_at(0.0));
        assert!(w.is_on_at(1.27));
        assert!(!w.is_on_at(1.3));
        assert!(w.is_on_at(6.3));
        assert!((Window::Continuous.repetition_s()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_window_always_on_when_on_equals_period() {
        let w = Window::RECONNECTION_HIGH_DUTY_CYCLE;
        assert!(w.is_on_at(1.279));
        assert!(w.is_on_at(1.28));
        assert!(w.off_s().abs() < f64::EPSILON);
    }

    #[test]
    fn test_pdu_type_round_trip() -> Result<(), CatalogError> {
        for t in PduType::ALL {
            assert_eq!(t.to_string().parse::<PduType>()?, t);
        }
        Ok(())
    }

    #[test]
    fn test_interval_serde_shape() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&AdvertisingInterval::LONG)?;
        assert_eq!(json, r#"{"millis":100.0}"#);
        let hdc: AdvertisingInterval = serde_json::from_str(r#""high_duty_cycle""#)?;
        assert_eq!(hdc, AdvertisingInterval::HighDutyCycle);
        Ok(())
    }
}
