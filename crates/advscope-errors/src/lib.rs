//! Error types for advscope
//!
//! This crate provides the error taxonomy shared by every advscope crate:
//! scanning, catalog lookups, schedule verdicts and test assertions all
//! report through it.
//!
//! # Architecture
//!
//! The error system is organized into several modules:
//!
//! - [`common`]: Top-level error type and classifications used across all crates
//! - [`scan`]: Scanner and orchestration errors
//! - [`catalog`]: Series catalog, payload template and AD-structure errors
//! - [`schedule`]: Structured schedule violations raised by the checker
//! - [`assertion`]: Failures of the high-level advertising assertions
//! - [`validation`]: Configuration validation errors
//!
//! # Example
//!
//! ```
//! use advscope_errors::prelude::*;
//!
//! fn check_duration(duration_s: f64) -> Result<f64> {
//!     if duration_s >= 3600.0 {
//!         return Err(ScanError::duration_too_long(duration_s, 3600.0).into());
//!     }
//!     Ok(duration_s)
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertion;
pub mod catalog;
pub mod common;
pub mod prelude;
pub mod scan;
pub mod schedule;
pub mod validation;

pub use assertion::AssertionFailure;
pub use catalog::CatalogError;
pub use common::{AdvScopeError, ErrorCategory, ErrorContext, ErrorSeverity, ResultExt};
pub use scan::ScanError;
pub use schedule::{Bound, Contract, ScheduleError, ScheduleViolation};
pub use validation::ValidationError;

/// A specialized `Result` type for advscope operations.
pub type Result<T, E = AdvScopeError> = std::result::Result<T, E>;
