//! One scan at a time, with or without a DUT trigger.

use advscope_analysis::{BleAddress, ScanTranscript};
use advscope_errors::{AdvScopeError, ScanError};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::scanner::{AddressProbe, DutTrigger, ScanRequest, Scanner};

/// How a scan ends and what it asks of the DUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    /// Send a scan request for every advertising packet
    pub send_scan_request: bool,
    /// Scan for the whole duration even once every address was seen
    pub force_full_duration: bool,
}

impl ScanOptions {
    /// Stop as soon as every requested address was seen.
    pub const UNTIL_FOUND: Self = Self {
        send_scan_request: false,
        force_full_duration: false,
    };

    /// Scan for the whole duration.
    pub const FULL: Self = Self {
        send_scan_request: false,
        force_full_duration: true,
    };

    /// The same options with scan requests enabled.
    #[must_use]
    pub const fn with_scan_requests(self) -> Self {
        Self {
            send_scan_request: true,
            ..self
        }
    }
}

/// Drives a [`Scanner`] for a DUT whose address comes from an [`AddressProbe`].
///
/// Methods take `&mut self`, so a session never runs two scans at once.
#[derive(Debug)]
pub struct ScanSession<S, P> {
    scanner: S,
    probe: P,
    config: ScanConfig,
}

impl<S: Scanner, P: AddressProbe> ScanSession<S, P> {
    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(scanner: S, probe: P, config: ScanConfig) -> Result<Self, AdvScopeError> {
        config.validate()?;
        Ok(Self { scanner, probe, config })
    }

    /// The timing configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The scanner.
    #[must_use]
    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// The address probe.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Give back the collaborators.
    #[must_use]
    pub fn into_parts(self) -> (S, P) {
        (self.scanner, self.probe)
    }

    /// The DUT's current address, forcing its last address once if it has none.
    ///
    /// # Errors
    ///
    /// Returns the probe's error when the retry fails too.
    pub fn current_address(&mut self) -> Result<BleAddress, ScanError> {
        match self.probe.current_address() {
            Ok(address) => Ok(address),
            Err(err) => {
                warn!(error = %err, "no current address, forcing the last one");
                self.probe.force_last_address()?;
                self.probe.current_address()
            }
        }
    }

    /// `addresses`, or the DUT's current address when empty.
    ///
    /// # Errors
    ///
    /// See [`ScanSession::current_address`].
    pub fn resolve_addresses(&mut self, addresses: &[BleAddress]) -> Result<Vec<BleAddress>, ScanError> {
        if addresses.is_empty() {
            return Ok(vec![self.current_address()?]);
        }
        Ok(addresses.to_vec())
    }

    /// Scan for `duration_s` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::DurationTooLong`] for durations at or above the
    /// configured maximum, [`ScanError::DeviceNotFound`] when a requested
    /// address sent nothing, and any collaborator error.
    pub fn scan(
        &mut self,
        addresses: &[BleAddress],
        duration_s: f64,
        options: ScanOptions,
    ) -> Result<ScanTranscript, ScanError> {
        self.run(addresses, duration_s, None, options)
    }

    /// Start a scan, fire `trigger`, then wait for the scan to end.
    ///
    /// # Errors
    ///
    /// As [`ScanSession::scan`], plus [`ScanError::TriggerFailed`].
    pub fn scan_with_trigger(
        &mut self,
        addresses: &[BleAddress],
        duration_s: f64,
        trigger: &mut dyn DutTrigger,
        options: ScanOptions,
    ) -> Result<ScanTranscript, ScanError> {
        self.run(addresses, duration_s, Some(trigger), options)
    }

    fn run(
        &mut self,
        addresses: &[BleAddress],
        duration_s: f64,
        trigger: Option<&mut dyn DutTrigger>,
        options: ScanOptions,
    ) -> Result<ScanTranscript, ScanError> {
        let max_s = self.config.max_scan_duration_s;
        if !(duration_s >= 0.0 && duration_s < max_s) {
            return Err(ScanError::duration_too_long(duration_s, max_s));
        }
        let addresses = self.resolve_addresses(addresses)?;
        let request = ScanRequest {
            addresses,
            timeout_s: self.config.timeout_s(duration_s),
            send_scan_request: options.send_scan_request,
            force_full_duration: options.force_full_duration,
        };
        info!(
            addresses = request.addresses.len(),
            timeout_s = request.timeout_s,
            full = request.force_full_duration,
            scan_requests = request.send_scan_request,
            "starting scan"
        );
        let handle = self.scanner.start_scan(&request)?;

        if let Some(trigger) = trigger {
            let kind = trigger.kind();
            debug!(%kind, "firing trigger");
            if let Err(err) = trigger.fire() {
                warn!(%kind, error = %err, "trigger failed, draining the scan");
                if let Err(drain) = self.scanner.collect(handle) {
                    debug!(error = %drain, "scan drain failed");
                }
                return Err(match err {
                    ScanError::TriggerFailed { .. } => err,
                    other => ScanError::trigger_failed(kind.to_string(), other.to_string()),
                });
            }
        }

        let transcript = self.scanner.collect(handle)?;
        let missing: Vec<String> = request
            .addresses
            .iter()
            .filter(|address| transcript.device(address).is_none_or(|d| d.packet_count() == 0))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ScanError::device_not_found(missing));
        }
        debug!(
            devices = transcript.devices.len(),
            span_s = transcript.duration_s(),
            "scan collected"
        );
        Ok(transcript)
    }
}
