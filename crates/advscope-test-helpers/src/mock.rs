//! Test doubles for the scan collaborators.
//!
//! Each double is a cheap handle over shared state: clone it, hand one clone
//! to the code under test and inspect the other afterwards.

use std::collections::VecDeque;
use std::sync::Arc;

use advscope_analysis::{BleAddress, ScanTranscript};
use advscope_errors::ScanError;
use advscope_scan::{AddressProbe, DutTrigger, ScanHandle, ScanRequest, Scanner, TriggerKind};
use parking_lot::Mutex;

use crate::fixtures::DUT_ADDRESS;

/// A call received by [`MockScanner`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerCall {
    /// `start_scan`
    Start(ScanRequest),
    /// `collect`
    Collect(ScanHandle),
}

#[derive(Debug, Default)]
struct ScannerState {
    scripted: VecDeque<Result<ScanTranscript, ScanError>>,
    calls: Vec<ScannerCall>,
    fail_start: Option<ScanError>,
    last_request: Option<ScanRequest>,
    next_handle: u64,
}

/// Scanner replaying scripted transcripts.
///
/// Each `collect` pops the next scripted result, keeping only the devices
/// the scan asked for, like a real scanner filtering by address. Once the
/// script is exhausted it returns an empty transcript.
#[derive(Debug, Clone, Default)]
pub struct MockScanner {
    state: Arc<Mutex<ScannerState>>,
}

impl MockScanner {
    /// A scanner with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scanner returning `transcript` once.
    pub fn with_transcript(transcript: ScanTranscript) -> Self {
        let scanner = Self::new();
        scanner.push_transcript(transcript);
        scanner
    }

    /// Script the next `collect` result.
    pub fn push_transcript(&self, transcript: ScanTranscript) {
        self.state.lock().scripted.push_back(Ok(transcript));
    }

    /// Script a failing `collect`.
    pub fn push_error(&self, error: ScanError) {
        self.state.lock().scripted.push_back(Err(error));
    }

    /// Make every `start_scan` fail with `error`.
    pub fn fail_start(&self, error: ScanError) {
        self.state.lock().fail_start = Some(error);
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<ScannerCall> {
        self.state.lock().calls.clone()
    }

    /// Every scan request so far.
    pub fn requests(&self) -> Vec<ScanRequest> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ScannerCall::Start(request) => Some(request.clone()),
                ScannerCall::Collect(_) => None,
            })
            .collect()
    }

    /// Number of `collect` calls.
    pub fn collect_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ScannerCall::Collect(_)))
            .count()
    }
}

impl Scanner for MockScanner {
    fn start_scan(&mut self, request: &ScanRequest) -> Result<ScanHandle, ScanError> {
        let mut state = self.state.lock();
        state.calls.push(ScannerCall::Start(request.clone()));
        if let Some(error) = state.fail_start.clone() {
            return Err(error);
        }
        state.next_handle += 1;
        state.last_request = Some(request.clone());
        Ok(ScanHandle(state.next_handle))
    }

    fn collect(&mut self, handle: ScanHandle) -> Result<ScanTranscript, ScanError> {
        let mut state = self.state.lock();
        state.calls.push(ScannerCall::Collect(handle));
        let mut transcript = state.scripted.pop_front().unwrap_or_else(|| Ok(ScanTranscript::default()))?;
        if let Some(request) = &state.last_request
            && !request.addresses.is_empty()
        {
            transcript
                .devices
                .retain(|d| request.addresses.contains(&d.address));
        }
        Ok(transcript)
    }

    fn central_address(&self) -> Result<BleAddress, ScanError> {
        Ok(BleAddress([0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x13]))
    }
}

#[derive(Debug)]
struct ProbeState {
    current: Option<BleAddress>,
    last: Option<BleAddress>,
    queries: usize,
    forced: usize,
}

/// Address probe with a settable current and last address.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl MockProbe {
    /// A DUT currently advertising on `address`.
    pub fn new(address: BleAddress) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProbeState {
                current: Some(address),
                last: Some(address),
                queries: 0,
                forced: 0,
            })),
        }
    }

    /// A DUT without a current address that recovers `last` when forced.
    pub fn without_current(last: BleAddress) -> Self {
        let probe = Self::new(last);
        probe.state.lock().current = None;
        probe
    }

    /// A DUT that never reports an address.
    pub fn unavailable() -> Self {
        let probe = Self::new(DUT_ADDRESS);
        {
            let mut state = probe.state.lock();
            state.current = None;
            state.last = None;
        }
        probe
    }

    /// Number of `current_address` calls.
    pub fn queries(&self) -> usize {
        self.state.lock().queries
    }

    /// Number of `force_last_address` calls.
    pub fn forced(&self) -> usize {
        self.state.lock().forced
    }
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new(DUT_ADDRESS)
    }
}

impl AddressProbe for MockProbe {
    fn current_address(&mut self) -> Result<BleAddress, ScanError> {
        let mut state = self.state.lock();
        state.queries += 1;
        state
            .current
            .ok_or_else(|| ScanError::address_unavailable("no current GAP address"))
    }

    fn force_last_address(&mut self) -> Result<(), ScanError> {
        let mut state = self.state.lock();
        state.forced += 1;
        match state.last {
            Some(last) => {
                state.current = Some(last);
                Ok(())
            }
            None => Err(ScanError::address_unavailable("no last GAP address stored")),
        }
    }
}

#[derive(Debug, Default)]
struct TriggerState {
    fired: usize,
    fail: Option<ScanError>,
}

/// Trigger counting how often it fired.
#[derive(Debug, Clone)]
pub struct MockTrigger {
    kind: TriggerKind,
    state: Arc<Mutex<TriggerState>>,
}

impl MockTrigger {
    /// A trigger of `kind` that always succeeds.
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(TriggerState::default())),
        }
    }

    /// A pairing-mode trigger.
    pub fn pairing() -> Self {
        Self::new(TriggerKind::PairingMode)
    }

    /// Make every firing fail with `error`.
    pub fn fail_with(&self, error: ScanError) {
        self.state.lock().fail = Some(error);
    }

    /// Number of firings.
    pub fn fired(&self) -> usize {
        self.state.lock().fired
    }
}

impl DutTrigger for MockTrigger {
    fn fire(&mut self) -> Result<(), ScanError> {
        let mut state = self.state.lock();
        state.fired += 1;
        match &state.fail {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn kind(&self) -> TriggerKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TranscriptBuilder, continuous};
    use advscope_catalog::PduType;

    #[test]
    fn test_scanner_filters_by_address() {
        let other = BleAddress([1; 6]);
        let transcript = TranscriptBuilder::new()
            .device(DUT_ADDRESS, PduType::ConnectableUndirected)
            .advertising(&[1], continuous(0, 20.0, 3))
            .device(other, PduType::NonConnectableUndirected)
            .advertising(&[2], continuous(0, 100.0, 3))
            .build();
        let mut scanner = MockScanner::with_transcript(transcript);
        let request = ScanRequest {
            addresses: vec![other],
            timeout_s: 1.0,
            send_scan_request: false,
            force_full_duration: true,
        };
        let handle = scanner.start_scan(&request).unwrap();
        let seen = scanner.collect(handle).unwrap();
        assert_eq!(seen.devices.len(), 1);
        assert_eq!(seen.devices[0].address, other);
        assert_eq!(scanner.calls().len(), 2);
    }

    #[test]
    fn test_probe_recovers_last_address() {
        let mut probe = MockProbe::without_current(DUT_ADDRESS);
        assert!(probe.current_address().is_err());
        probe.force_last_address().unwrap();
        assert_eq!(probe.current_address().unwrap(), DUT_ADDRESS);
        assert_eq!(probe.forced(), 1);
        assert_eq!(probe.queries(), 2);
    }

    #[test]
    fn test_trigger_counts_and_fails() {
        let trigger = MockTrigger::pairing();
        let mut handle = trigger.clone();
        handle.fire().unwrap();
        trigger.fail_with(ScanError::trigger_failed("pairing mode", "no response"));
        assert!(handle.fire().is_err());
        assert_eq!(trigger.fired(), 2);
        assert_eq!(handle.kind(), TriggerKind::PairingMode);
    }
}
