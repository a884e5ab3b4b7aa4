//! High-level advertising assertions.
//!
//! Each assertion runs one scan through the [`ScanSession`], analyzes the
//! transcript and returns a report on success. Failures come back as
//! [`AdvScopeError`]: a verdict ([`AssertionFailure`] or a schedule error)
//! when the DUT misbehaved, anything else when a collaborator did.

use advscope_analysis::{
    AdvertisingAnalyzer, BleAddress, DeviceCapture, IntervalReport, PayloadCapture, PayloadIndex,
    ScanTranscript, SequenceReport,
};
use advscope_catalog::{
    AdStructure, CatalogSeries, PayloadBuilder, PduType, SeriesDefinition, SharedGroup,
    TemplatePayloadBuilder, parse_ad_structures, scan_time, scan_time_one_window_each,
    shared_payload_groups, shared_scan_response_groups,
};
use advscope_errors::{
    AdvScopeError, AssertionFailure, CatalogError, ErrorContext, ResultExt, ScanError,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::scanner::{AddressProbe, DutTrigger, Scanner};
use crate::session::{ScanOptions, ScanSession};

/// Observed PDU type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PduTypeReport {
    /// Device checked
    pub address: BleAddress,
    /// Its PDU type
    pub pdu_type: PduType,
}

/// Observed advertising duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    /// First to last packet over every device, seconds
    pub observed_s: f64,
    /// Expected duration, seconds
    pub expected_s: f64,
    /// Accepted error, seconds
    pub tolerance_s: f64,
}

/// Decoded content of one shared-payload group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupContent {
    /// Series sharing the payload, comma separated
    pub group: String,
    /// AD structures, as captured and as expected
    pub structures: Vec<AdStructure>,
}

/// Content of every payload checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentReport {
    /// Device checked
    pub address: BleAddress,
    /// One entry per shared-payload group
    pub groups: Vec<GroupContent>,
}

/// A scan during which the DUT stayed silent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SilenceReport {
    /// Device listened for
    pub address: BleAddress,
    /// Seconds scanned
    pub duration_s: f64,
}

/// A full sequence check.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceCheck {
    /// Address the application series were found on
    pub pairing_address: BleAddress,
    /// Address the prepairing series was found on, if any
    pub prepairing_address: Option<BleAddress>,
    /// Seconds scanned, margin excluded
    pub duration_s: f64,
    /// The analysis
    pub report: SequenceReport,
}

/// Advertising assertions on one DUT.
///
/// `trigger` is fired at the start of every scan that needs the DUT to enter
/// the advertising state under test.
#[derive(Debug)]
pub struct AdvertisingAssertions<S, P, T, B = TemplatePayloadBuilder> {
    session: ScanSession<S, P>,
    trigger: T,
    builder: B,
    analyzer: AdvertisingAnalyzer,
}

impl<S, P, T, B> AdvertisingAssertions<S, P, T, B>
where
    S: Scanner,
    P: AddressProbe,
    T: DutTrigger,
    B: PayloadBuilder,
{
    /// Create the assertion layer.
    pub fn new(session: ScanSession<S, P>, trigger: T, builder: B, analyzer: AdvertisingAnalyzer) -> Self {
        Self {
            session,
            trigger,
            builder,
            analyzer,
        }
    }

    /// The session scans go through.
    #[must_use]
    pub fn session(&self) -> &ScanSession<S, P> {
        &self.session
    }

    /// The analyzer in use.
    #[must_use]
    pub fn analyzer(&self) -> &AdvertisingAnalyzer {
        &self.analyzer
    }

    fn extra_s(&self) -> f64 {
        self.session.config().extra_scan_time_s
    }

    fn triggered(&mut self, duration_s: f64, options: ScanOptions) -> Result<ScanTranscript, ScanError> {
        self.session
            .scan_with_trigger(&[], duration_s, &mut self.trigger, options)
    }

    /// Trigger the DUT, scan until it is seen and check its PDU type.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::WrongPduType`] on a mismatch and
    /// [`ScanError::DeviceNotFound`] if the DUT stays silent for `scan_window_s`.
    pub fn expect_advertising_type(
        &mut self,
        expected: PduType,
        scan_window_s: f64,
    ) -> Result<PduTypeReport, AdvScopeError> {
        let transcript = self
            .triggered(scan_window_s, ScanOptions::UNTIL_FOUND)
            .with_context("expect_advertising_type")?;
        let device = first_advertising(&transcript)?;
        if device.pdu_type != expected {
            return Err(AssertionFailure::WrongPduType {
                expected: expected.to_string(),
                observed: device.pdu_type.to_string(),
            }
            .into());
        }
        info!(address = %device.address, pdu_type = %expected, "advertising type as expected");
        Ok(PduTypeReport {
            address: device.address,
            pdu_type: device.pdu_type,
        })
    }

    /// Trigger the DUT, scan past the expected end and check how long it advertised.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::DurationOutOfTolerance`] when first to last
    /// packet is not within `expected_s ± tolerance_s`.
    pub fn expect_advertising_duration(
        &mut self,
        expected_s: f64,
        tolerance_s: f64,
    ) -> Result<DurationReport, AdvScopeError> {
        let scan_s = expected_s + self.extra_s();
        let transcript = self
            .triggered(scan_s, ScanOptions::FULL)
            .with_context("expect_advertising_duration")?;
        let observed_s = transcript.duration_s();
        info!(observed_s, expected_s, tolerance_s, "advertising duration");
        if (observed_s - expected_s).abs() > tolerance_s {
            return Err(AssertionFailure::DurationOutOfTolerance {
                observed_s,
                expected_s,
                tolerance_s,
            }
            .into());
        }
        Ok(DurationReport {
            observed_s,
            expected_s,
            tolerance_s,
        })
    }

    /// Trigger the DUT, scan every expected series and check the intervals.
    ///
    /// # Errors
    ///
    /// Returns the interval failure, see
    /// [`AdvertisingAnalyzer::check_intervals`].
    pub fn expect_interval(
        &mut self,
        expected: &[SeriesDefinition],
        check_all: bool,
        max_scan_s: Option<f64>,
    ) -> Result<IntervalReport, AdvScopeError> {
        let scan_s = scan_time(expected, max_scan_s) + self.extra_s();
        let transcript = self
            .triggered(scan_s, ScanOptions::FULL)
            .context(ErrorContext::new("expect_interval").with("scan_s", scan_s.to_string()))?;
        let index = PayloadIndex::new(expected, &self.builder)?;
        let report = self.analyzer.check_intervals(&transcript, &index, check_all)?;
        Ok(report)
    }

    /// Scan the whole expected sequence and check its schedule.
    ///
    /// With `pairing` the trigger is fired at the start of the scan. With
    /// `prepairing` the DUT advertises the prepairing series on its current
    /// address and the application series on the next one; both must be
    /// seen and every packet of the former counts as the `D` series.
    /// `duration_s` defaults to the lifetime of the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::UnexpectedDeviceCount`] for stray or
    /// missing devices and [`AdvScopeError::Schedule`] when a series broke
    /// its schedule.
    pub fn expect_sequence(
        &mut self,
        expected: &[SeriesDefinition],
        pairing: bool,
        prepairing: bool,
        duration_s: Option<f64>,
    ) -> Result<SequenceCheck, AdvScopeError> {
        let op = "expect_sequence";
        let time_s = duration_s.unwrap_or_else(|| scan_time(expected, None));
        let current = self.session.current_address().with_context(op)?;
        let (pairing_address, prepairing_address) = if prepairing {
            (current.increment(), Some(current))
        } else {
            (current, None)
        };
        let addresses: Vec<BleAddress> = prepairing_address.into_iter().chain([pairing_address]).collect();

        let scan_s = time_s + self.extra_s();
        let transcript = if pairing {
            self.session
                .scan_with_trigger(&addresses, scan_s, &mut self.trigger, ScanOptions::FULL)
        } else {
            self.session.scan(&addresses, scan_s, ScanOptions::FULL)
        }
        .with_context(op)?;

        let advertising = transcript.devices.iter().filter(|d| d.packet_count() > 0).count();
        if advertising != addresses.len() {
            return Err(AssertionFailure::UnexpectedDeviceCount {
                expected: addresses.len(),
                found: advertising,
            }
            .into());
        }

        let mut index = PayloadIndex::new(expected, &self.builder)?;
        if let Some(address) = prepairing_address {
            let series = expected
                .iter()
                .position(|s| s.name == CatalogSeries::D.name())
                .ok_or_else(|| CatalogError::unknown_series(CatalogSeries::D.name()))?;
            if let Some(source) = transcript.devices.iter().position(|d| d.address == address) {
                index = index.pin_source(source, series);
            }
        }

        let report = self.analyzer.analyze_sequence(&transcript, &index, duration_s);
        for diagnostic in report.diagnostics() {
            warn!(%diagnostic, "sequence diagnostic");
        }
        report.ensure_passed()?;
        info!(series = expected.len(), time_s, prepairing, "advertising sequence as expected");
        Ok(SequenceCheck {
            pairing_address,
            prepairing_address,
            duration_s: time_s,
            report,
        })
    }

    /// Trigger the DUT, capture one window of each series and check every payload.
    ///
    /// The `i`-th shared-payload group is compared with the `i`-th payload
    /// the DUT sent.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::PacketContentMismatch`] for the first
    /// differing AD structure.
    pub fn expect_packet_content(&mut self, series: &[SeriesDefinition]) -> Result<ContentReport, AdvScopeError> {
        let scan_s = scan_time_one_window_each(series, None);
        let transcript = self
            .triggered(scan_s, ScanOptions::FULL)
            .with_context("expect_packet_content")?;
        let device = first_advertising(&transcript)?;
        let groups = compare_groups(&self.builder, series, &shared_payload_groups(series), &device.advertising)?;
        info!(address = %device.address, groups = groups.len(), "advertising content as expected");
        Ok(ContentReport {
            address: device.address,
            groups,
        })
    }

    /// As [`expect_packet_content`](Self::expect_packet_content), for scan responses.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::PacketContentMismatch`] for the first
    /// differing AD structure.
    pub fn expect_scan_response_content(
        &mut self,
        series: &[SeriesDefinition],
    ) -> Result<ContentReport, AdvScopeError> {
        let scan_s = scan_time_one_window_each(series, None);
        let transcript = self
            .triggered(scan_s, ScanOptions::FULL.with_scan_requests())
            .with_context("expect_scan_response_content")?;
        let device = first_advertising(&transcript)?;
        let groups = compare_groups(
            &self.builder,
            series,
            &shared_scan_response_groups(series),
            &device.scan_responses,
        )?;
        info!(address = %device.address, groups = groups.len(), "scan response content as expected");
        Ok(ContentReport {
            address: device.address,
            groups,
        })
    }

    /// Scan for `duration_s` and check the DUT sent nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure::DeviceStillAdvertising`] if any packet was
    /// received.
    pub fn check_device_not_advertising(&mut self, duration_s: f64) -> Result<SilenceReport, AdvScopeError> {
        let op = "check_device_not_advertising";
        let address = self.session.current_address().with_context(op)?;
        match self.session.scan(&[address], duration_s, ScanOptions::FULL) {
            Err(ScanError::DeviceNotFound { .. }) => {
                info!(%address, duration_s, "device silent as expected");
                Ok(SilenceReport { address, duration_s })
            }
            Ok(transcript) => {
                let packets = transcript.device(&address).map_or(0, DeviceCapture::packet_count);
                Err(AssertionFailure::DeviceStillAdvertising {
                    address: address.to_string(),
                    packets,
                }
                .into())
            }
            Err(err) => Err(err).with_context(op),
        }
    }
}

fn first_advertising(transcript: &ScanTranscript) -> Result<&DeviceCapture, AssertionFailure> {
    transcript
        .devices
        .iter()
        .find(|d| d.packet_count() > 0 || !d.scan_responses.is_empty())
        .ok_or(AssertionFailure::UnexpectedDeviceCount { expected: 1, found: 0 })
}

fn compare_groups<B: PayloadBuilder>(
    builder: &B,
    series: &[SeriesDefinition],
    groups: &[SharedGroup<'_>],
    captured: &[PayloadCapture],
) -> Result<Vec<GroupContent>, AdvScopeError> {
    let mut checked = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        let label = group.label(series);
        let Some(capture) = captured.get(i) else {
            return Err(AssertionFailure::content_mismatch(
                label,
                format!("payload #{i} not captured ({} received)", captured.len()),
            )
            .into());
        };
        let expected = parse_ad_structures(&builder.build(group.template)?)?;
        let observed = parse_ad_structures(&capture.payload).map_err(|err| {
            AdvScopeError::from(AssertionFailure::content_mismatch(label.clone(), err.to_string()))
        })?;
        compare_structures(&label, &expected, &observed)?;
        checked.push(GroupContent {
            group: label,
            structures: observed,
        });
    }
    Ok(checked)
}

/// Same count, same types in order, same values.
///
/// # Errors
///
/// Returns [`AssertionFailure::PacketContentMismatch`] naming the first difference.
pub fn compare_structures(
    group: &str,
    expected: &[AdStructure],
    observed: &[AdStructure],
) -> Result<(), AssertionFailure> {
    if expected.len() != observed.len() {
        return Err(AssertionFailure::content_mismatch(
            group,
            format!("{} AD structure(s), expected {}", observed.len(), expected.len()),
        ));
    }
    for (i, (want, got)) in expected.iter().zip(observed).enumerate() {
        if want.ad_type != got.ad_type {
            return Err(AssertionFailure::content_mismatch(
                group,
                format!("AD structure #{i} has type {:#04x}, expected {:#04x}", got.ad_type, want.ad_type),
            ));
        }
        if want.data != got.data {
            return Err(AssertionFailure::content_mismatch(
                group,
                format!("AD structure #{i}: {got}, expected {want}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_structures() {
        let expected = vec![AdStructure::new(0x01, [0x05_u8]), AdStructure::new(0x09, *b"MX")];
        assert!(compare_structures("A,B", &expected, &expected).is_ok());

        let shorter = vec![AdStructure::new(0x01, [0x05_u8])];
        assert!(matches!(
            compare_structures("A,B", &expected, &shorter),
            Err(AssertionFailure::PacketContentMismatch { .. })
        ));

        let swapped = vec![AdStructure::new(0x09, *b"MX"), AdStructure::new(0x01, [0x05_u8])];
        let err = compare_structures("A,B", &expected, &swapped);
        assert!(err.is_err_and(|e| e.to_string().contains("#0 has type 0x09")));

        let renamed = vec![AdStructure::new(0x01, [0x05_u8]), AdStructure::new(0x09, *b"MY")];
        let err = compare_structures("C", &expected, &renamed);
        assert!(err.is_err_and(|e| e.to_string().contains("#1")));
    }

    #[test]
    fn test_first_advertising_skips_silent_devices() -> Result<(), AssertionFailure> {
        let transcript = ScanTranscript::new(vec![
            DeviceCapture {
                address: BleAddress([1; 6]),
                pdu_type: PduType::ConnectableDirected,
                advertising: vec![],
                scan_responses: vec![],
            },
            DeviceCapture {
                address: BleAddress([2; 6]),
                pdu_type: PduType::ConnectableUndirected,
                advertising: vec![PayloadCapture::new(vec![1], vec![0])],
                scan_responses: vec![],
            },
        ]);
        assert_eq!(first_advertising(&transcript)?.address, BleAddress([2; 6]));
        assert!(first_advertising(&ScanTranscript::default()).is_err());
        Ok(())
    }
}
