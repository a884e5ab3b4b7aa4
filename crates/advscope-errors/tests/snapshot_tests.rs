//! Snapshot tests for error message formatting.
//!
//! These messages end up in test reports, so their wording is pinned.

use advscope_errors::{
    AssertionFailure, Bound, CatalogError, Contract, ScanError, ScheduleError, ScheduleViolation,
};
use insta::assert_snapshot;

mod scan_snapshots {
    use super::*;

    #[test]
    fn test_duration_too_long() {
        assert_snapshot!(
            ScanError::duration_too_long(3700.0, 3600.0).to_string(),
            @"Scan duration 3700s must be below 3600s"
        );
    }

    #[test]
    fn test_trigger_failed() {
        assert_snapshot!(
            ScanError::trigger_failed("pairing-mode", "emulator offline").to_string(),
            @"Trigger 'pairing-mode' failed: emulator offline"
        );
    }
}

mod catalog_snapshots {
    use super::*;

    #[test]
    fn test_service_data_order() {
        let err = CatalogError::IncompatibleServiceDataOrder {
            series: "C".into(),
            found: "0xFE2C".into(),
        };
        assert_snapshot!(
            err.to_string(),
            @"Series C: service data 0xFE2C precedes the BLE Pro service data in the scan response"
        );
    }
}

mod schedule_snapshots {
    use super::*;

    #[test]
    fn test_off_time_violation() {
        let err = ScheduleError::Violations(vec![ScheduleViolation::new(
            "E",
            Contract::WindowOffTime { index: 3 },
            5.2,
            Bound::between(4.7825, 5.2175),
        )]);
        assert_snapshot!(
            err.to_string(),
            @"1 schedule violation(s): series E: off-time 3 observed 5.2000, expected [4.7825, 5.2175]"
        );
    }

    #[test]
    fn test_overlap_resolution() {
        let v = ScheduleViolation::new(
            "A",
            Contract::OverlapResolution { index: 0 },
            2.5,
            Bound::between(1.1, 1.3),
        );
        assert_snapshot!(
            v.to_string(),
            @"series A: off-period 0 not caused by a higher-priority series observed 2.5000, expected [1.1000, 1.3000]"
        );
    }
}

mod assertion_snapshots {
    use super::*;

    #[test]
    fn test_device_still_advertising() {
        let err = AssertionFailure::DeviceStillAdvertising {
            address: "11:22:33:44:55:66".into(),
            packets: 12,
        };
        assert_snapshot!(
            err.to_string(),
            @"Device 11:22:33:44:55:66 is still advertising (12 packet(s) seen)"
        );
    }
}
