//! Scan orchestration and advertising assertions.
//!
//! The hardware is reached through three collaborator traits defined in
//! [`scanner`]: a BLE [`Scanner`], an [`AddressProbe`] reading the DUT's
//! current address and a [`DutTrigger`] putting the DUT in the state under
//! test. [`ScanSession`] runs one scan at a time over them, and
//! [`AdvertisingAssertions`] turns scans into verdicts with
//! `advscope-analysis`.
//!
//! # Example
//!
//! ```
//! use advscope_scan::prelude::*;
//!
//! let mut probe = FixedAddress(BleAddress([0xC0, 0x11, 0x22, 0x33, 0x44, 0x55]));
//! assert_eq!(probe.current_address()?.to_string(), "C0:11:22:33:44:55");
//!
//! let config = ScanConfig::default();
//! assert!((config.timeout_s(30.0) - 34.0).abs() < 1e-9);
//! # Ok::<(), advscope_errors::ScanError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod config;
pub mod prelude;
pub mod scanner;
pub mod session;

pub use advscope_analysis::{BleAddress, ScanTranscript};
pub use assertions::{
    AdvertisingAssertions, ContentReport, DurationReport, GroupContent, PduTypeReport, SequenceCheck,
    SilenceReport, compare_structures,
};
pub use config::ScanConfig;
pub use scanner::{
    AddressProbe, DutTrigger, FixedAddress, KindedTrigger, ScanHandle, ScanRequest, Scanner, TriggerKind,
};
pub use session::{ScanOptions, ScanSession};
