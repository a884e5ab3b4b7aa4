//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use advscope_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_parse, must_some, must_with};

#[cfg(feature = "fixtures")]
pub use crate::fixtures::{
    DUT_ADDRESS, MS, SECOND, TranscriptBuilder, continuous, device, drop_every, duty_cycled,
    ideal_transcript, shifted, span,
};

#[cfg(feature = "mock")]
pub use crate::mock::{MockProbe, MockScanner, MockTrigger, ScannerCall};

pub use crate::{assert_all_near, assert_approx_eq, assert_sorted};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
