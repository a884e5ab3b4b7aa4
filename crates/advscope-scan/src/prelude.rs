//! Prelude module for convenient imports.

pub use crate::{
    AddressProbe, AdvertisingAssertions, BleAddress, DutTrigger, FixedAddress, KindedTrigger,
    ScanConfig, ScanHandle, ScanOptions, ScanRequest, ScanSession, ScanTranscript, Scanner,
    TriggerKind,
};
pub use advscope_errors::{AdvScopeError, ScanError};
