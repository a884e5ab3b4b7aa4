//! Property-based tests for scan timing and the content and duration assertions.

use advscope_analysis::AdvertisingAnalyzer;
use advscope_catalog::prelude::*;
use advscope_errors::{AdvScopeError, AssertionFailure};
use advscope_scan::prelude::*;
use advscope_scan::compare_structures;
use advscope_test_helpers::prelude::*;
use proptest::prelude::*;

fn any_structures() -> impl Strategy<Value = Vec<AdStructure>> {
    proptest::collection::vec(
        (1u8..=0xFF, proptest::collection::vec(any::<u8>(), 1..12)).prop_map(|(t, d)| AdStructure::new(t, d)),
        1..5,
    )
}

fn any_config() -> impl Strategy<Value = ScanConfig> {
    (0.0f64..60.0, 0.0f64..60.0, 1.0f64..=3600.0).prop_map(|(trigger, extra, max)| ScanConfig {
        scan_trigger_time_s: trigger,
        extra_scan_time_s: extra,
        max_scan_duration_s: max,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_timeout_covers_trigger_time(config in any_config(), duration_s in 0.0f64..3600.0) {
        prop_assert!(config.validate().is_ok());
        let margin = config.timeout_s(duration_s) - duration_s;
        prop_assert!((margin - config.scan_trigger_time_s).abs() < 1e-9);
    }

    #[test]
    fn prop_overlong_scan_never_reaches_scanner(config in any_config(), over in 0.0f64..100.0) {
        let scanner = MockScanner::new();
        let mut session = ScanSession::new(scanner.clone(), MockProbe::default(), config)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let result = session.scan(&[DUT_ADDRESS], config.max_scan_duration_s + over, ScanOptions::FULL);
        prop_assert!(
            matches!(result, Err(ScanError::DurationTooLong { .. })),
            "expected DurationTooLong error"
        );
        prop_assert!(scanner.calls().is_empty());
    }

    #[test]
    fn prop_structures_match_themselves(structures in any_structures()) {
        prop_assert!(compare_structures("G", &structures, &structures).is_ok());
    }

    #[test]
    fn prop_single_byte_change_is_reported(
        structures in any_structures(),
        pick in any::<prop::sample::Index>(),
        flip in 1u8..=0xFF,
    ) {
        let mut observed = structures.clone();
        let i = pick.index(observed.len());
        if let Some(s) = observed.get_mut(i)
            && let Some(b) = s.data.first_mut()
        {
            *b ^= flip;
        }
        let result = compare_structures("G", &structures, &observed);
        prop_assert!(
            matches!(&result, Err(AssertionFailure::PacketContentMismatch { .. })),
            "change in structure #{} not reported", i
        );
        prop_assert!(
            result.is_err_and(|e| e.to_string().contains(&format!("#{i}"))),
            "error message does not name structure #{}", i
        );
    }

    #[test]
    fn prop_duration_verdict_matches_tolerance(
        packets in 2usize..400,
        expected_s in 1.0f64..10.0,
        tolerance_s in 0.1f64..2.0,
    ) {
        let timestamps = continuous(0, 20.0, packets);
        let observed_s = timestamps.last().copied().unwrap_or_default() as f64 / 1e9;
        let scanner = MockScanner::with_transcript(
            TranscriptBuilder::new()
                .device(DUT_ADDRESS, PduType::ConnectableUndirected)
                .advertising(&[0x02, 0x01, 0x06], timestamps)
                .build(),
        );
        let session = ScanSession::new(scanner, MockProbe::default(), ScanConfig::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut assertions = AdvertisingAssertions::new(
            session,
            MockTrigger::pairing(),
            TemplatePayloadBuilder::new(DeviceProfile::default()),
            AdvertisingAnalyzer::default(),
        );

        let within = (observed_s - expected_s).abs() <= tolerance_s;
        match assertions.expect_advertising_duration(expected_s, tolerance_s) {
            Ok(report) => {
                prop_assert!(within);
                prop_assert!((report.observed_s - observed_s).abs() < 1e-9);
            }
            Err(AdvScopeError::Assertion(AssertionFailure::DurationOutOfTolerance { .. })) => prop_assert!(!within),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
