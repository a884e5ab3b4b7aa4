//! Snapshot tests for assertion reports and the errors they surface.

use advscope_analysis::AdvertisingAnalyzer;
use advscope_catalog::prelude::*;
use advscope_scan::prelude::*;
use advscope_test_helpers::prelude::*;
use insta::assert_snapshot;

type Assertions = AdvertisingAssertions<MockScanner, MockProbe, MockTrigger>;

fn assertions(scanner: MockScanner, trigger: MockTrigger) -> Result<Assertions, AdvScopeError> {
    let session = ScanSession::new(scanner, MockProbe::default(), ScanConfig::default())?;
    Ok(AdvertisingAssertions::new(
        session,
        trigger,
        TemplatePayloadBuilder::new(DeviceProfile::default()),
        AdvertisingAnalyzer::default(),
    ))
}

fn short_burst() -> ScanTranscript {
    TranscriptBuilder::new()
        .device(DUT_ADDRESS, PduType::ConnectableUndirected)
        .advertising(&[0x02, 0x01, 0x06], span(0.0, 1.0, 100.0))
        .build()
}

#[test]
fn test_pdu_type_report_json() -> TestResult {
    let mut checks = assertions(MockScanner::with_transcript(short_burst()), MockTrigger::pairing())?;
    let report = checks.expect_advertising_type(PduType::ConnectableUndirected, 5.0)?;
    assert_snapshot!(serde_json::to_string_pretty(&report)?, @r#"
    {
      "address": "C0:4D:3A:10:20:30",
      "pdu_type": "connectable_undirected"
    }
    "#);
    Ok(())
}

#[test]
fn test_silence_report_json() -> TestResult {
    let mut checks = assertions(MockScanner::new(), MockTrigger::pairing())?;
    let report = checks.check_device_not_advertising(5.0)?;
    assert_snapshot!(serde_json::to_string_pretty(&report)?, @r#"
    {
      "address": "C0:4D:3A:10:20:30",
      "duration_s": 5.0
    }
    "#);
    Ok(())
}

#[test]
fn test_still_advertising_message() -> TestResult {
    let mut checks = assertions(MockScanner::with_transcript(short_burst()), MockTrigger::pairing())?;
    let Err(err) = checks.check_device_not_advertising(5.0) else {
        return Err("device was advertising".into());
    };
    assert_snapshot!(err.to_string(), @"Assertion failed: Device C0:4D:3A:10:20:30 is still advertising (10 packet(s) seen)");
    Ok(())
}

#[test]
fn test_trigger_failure_message() -> TestResult {
    let trigger = MockTrigger::pairing();
    trigger.fail_with(ScanError::scanner_io("button emulator offline"));
    let mut checks = assertions(MockScanner::with_transcript(short_burst()), trigger)?;
    let Err(err) = checks.expect_advertising_type(PduType::ConnectableUndirected, 5.0) else {
        return Err("trigger failure was swallowed".into());
    };
    assert_snapshot!(
        err.to_string(),
        @"operation: expect_advertising_type: Scan error: Trigger 'pairing mode' failed: Scanner I/O error: button emulator offline"
    );
    Ok(())
}

#[test]
fn test_content_mismatch_message() -> TestResult {
    let expected = vec![AdStructure::new(0x01, [0x06_u8]), AdStructure::new(0x09, *b"MX Keys")];
    let observed = vec![AdStructure::new(0x01, [0x06_u8]), AdStructure::new(0x09, *b"MX Kays")];
    let Err(err) = advscope_scan::compare_structures("E,F", &expected, &observed) else {
        return Err("names differ".into());
    };
    assert_snapshot!(
        err.to_string(),
        @"Packet content mismatch for E,F: AD structure #1: 0x09:4D58204B617973, expected 0x09:4D58204B657973"
    );
    Ok(())
}
