//! Collaborator traits: the scanner, the DUT address probe and the DUT trigger.
//!
//! Implementations talk to real hardware (a BLE dongle, the DUT's debug
//! link, a button emulator). Everything in this crate only sees these traits.

use core::fmt;

use advscope_analysis::{BleAddress, ScanTranscript};
use advscope_errors::ScanError;
use serde::{Deserialize, Serialize};

/// Parameters of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Addresses to listen for; packets from anything else are ignored
    pub addresses: Vec<BleAddress>,
    /// Seconds after which the scanner stops on its own
    pub timeout_s: f64,
    /// Send a scan request for every advertising packet
    pub send_scan_request: bool,
    /// Scan until the timeout even after every address was seen
    pub force_full_duration: bool,
}

/// Identifies a scan started with [`Scanner::start_scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanHandle(pub u64);

/// A BLE central able to run one scan at a time.
pub trait Scanner {
    /// Start scanning. Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ScannerIo`] if the scan cannot be started.
    fn start_scan(&mut self, request: &ScanRequest) -> Result<ScanHandle, ScanError>;

    /// Block until the scan identified by `handle` ends and return what it saw.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ScannerIo`] if the scanner failed mid-scan.
    fn collect(&mut self, handle: ScanHandle) -> Result<ScanTranscript, ScanError>;

    /// Address of the scanner itself.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ScannerIo`] if the scanner cannot be queried.
    fn central_address(&self) -> Result<BleAddress, ScanError>;
}

impl<T: Scanner + ?Sized> Scanner for &mut T {
    fn start_scan(&mut self, request: &ScanRequest) -> Result<ScanHandle, ScanError> {
        (**self).start_scan(request)
    }

    fn collect(&mut self, handle: ScanHandle) -> Result<ScanTranscript, ScanError> {
        (**self).collect(handle)
    }

    fn central_address(&self) -> Result<BleAddress, ScanError> {
        (**self).central_address()
    }
}

impl<T: Scanner + ?Sized> Scanner for Box<T> {
    fn start_scan(&mut self, request: &ScanRequest) -> Result<ScanHandle, ScanError> {
        (**self).start_scan(request)
    }

    fn collect(&mut self, handle: ScanHandle) -> Result<ScanTranscript, ScanError> {
        (**self).collect(handle)
    }

    fn central_address(&self) -> Result<BleAddress, ScanError> {
        (**self).central_address()
    }
}

/// Reads the address the DUT currently advertises on.
pub trait AddressProbe {
    /// The DUT's current GAP address.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::AddressUnavailable`] when the DUT has no current
    /// address, e.g. right after a factory reset.
    fn current_address(&mut self) -> Result<BleAddress, ScanError>;

    /// Make the DUT reuse the last address it advertised on.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::AddressUnavailable`] if the DUT refuses.
    fn force_last_address(&mut self) -> Result<(), ScanError>;
}

impl<T: AddressProbe + ?Sized> AddressProbe for &mut T {
    fn current_address(&mut self) -> Result<BleAddress, ScanError> {
        (**self).current_address()
    }

    fn force_last_address(&mut self) -> Result<(), ScanError> {
        (**self).force_last_address()
    }
}

/// A fixed address, for DUTs whose address is known up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAddress(pub BleAddress);

impl AddressProbe for FixedAddress {
    fn current_address(&mut self) -> Result<BleAddress, ScanError> {
        Ok(self.0)
    }

    fn force_last_address(&mut self) -> Result<(), ScanError> {
        Ok(())
    }
}

/// What a trigger makes the DUT do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Enter BLE pairing mode
    PairingMode,
    /// A user action such as a key press
    #[default]
    UserAction,
    /// Reset into the bootloader
    BootloaderEntry,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::PairingMode => write!(f, "pairing mode"),
            TriggerKind::UserAction => write!(f, "user action"),
            TriggerKind::BootloaderEntry => write!(f, "bootloader entry"),
        }
    }
}

/// Puts the DUT in the state whose advertising is under test.
///
/// Fired right after the scan started so the first packets are captured.
/// Any `FnMut() -> Result<(), ScanError>` closure is a trigger of kind
/// [`TriggerKind::UserAction`]; wrap it in [`KindedTrigger`] to name another kind.
pub trait DutTrigger {
    /// Perform the action.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::TriggerFailed`] when the DUT could not be driven.
    fn fire(&mut self) -> Result<(), ScanError>;

    /// The kind of action performed.
    fn kind(&self) -> TriggerKind {
        TriggerKind::UserAction
    }
}

impl<F> DutTrigger for F
where
    F: FnMut() -> Result<(), ScanError>,
{
    fn fire(&mut self) -> Result<(), ScanError> {
        self()
    }
}

/// A closure trigger with an explicit kind.
#[derive(Debug, Clone)]
pub struct KindedTrigger<F> {
    kind: TriggerKind,
    action: F,
}

impl<F> KindedTrigger<F>
where
    F: FnMut() -> Result<(), ScanError>,
{
    /// Wrap `action` as a trigger of `kind`.
    pub fn new(kind: TriggerKind, action: F) -> Self {
        Self { kind, action }
    }
}

impl<F> DutTrigger for KindedTrigger<F>
where
    F: FnMut() -> Result<(), ScanError>,
{
    fn fire(&mut self) -> Result<(), ScanError> {
        (self.action)()
    }

    fn kind(&self) -> TriggerKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_trigger() -> Result<(), ScanError> {
        let mut fired = 0;
        {
            let mut trigger = || -> Result<(), ScanError> {
                fired += 1;
                Ok(())
            };
            trigger.fire()?;
            assert_eq!(trigger.kind(), TriggerKind::UserAction);
        }
        assert_eq!(fired, 1);
        Ok(())
    }

    #[test]
    fn test_kinded_trigger() {
        let mut trigger = KindedTrigger::new(TriggerKind::PairingMode, || {
            Err(ScanError::trigger_failed("pairing mode", "button stuck"))
        });
        assert_eq!(trigger.kind(), TriggerKind::PairingMode);
        assert!(matches!(trigger.fire(), Err(ScanError::TriggerFailed { .. })));
    }

    #[test]
    fn test_fixed_address() -> Result<(), ScanError> {
        let address = BleAddress([0xC0, 1, 2, 3, 4, 5]);
        let mut probe = FixedAddress(address);
        probe.force_last_address()?;
        assert_eq!(probe.current_address()?, address);
        Ok(())
    }
}
