//! Offline analysis of BLE advertising captures.
//!
//! Turns a [`ScanTranscript`] into a verdict on whether a device advertised
//! the series it was expected to, in the expected order and with the
//! expected timings:
//!
//! - [`parser`]: transcript records into per-source, per-payload batches
//! - [`transition`]: cutting a batch where a shared payload changed interval
//! - [`classifier`]: batch labeling and good/wrong interval filtering
//! - [`statistics`]: per-series window timings and intervals
//! - [`schedule`]: the schedule checker and its verdicts
//! - [`interval_check`]: the per-interval assertion
//! - [`pipeline`]: all of the above behind [`AdvertisingAnalyzer`]
//!
//! Everything here is a pure transformation of its input. The parser and
//! classifier never fail; what they drop or guess is reported as a
//! [`Diagnostic`].
//!
//! # Example
//!
//! ```
//! use advscope_analysis::prelude::*;
//! use advscope_catalog::{CatalogSeries, DeviceProfile, TemplatePayloadBuilder};
//!
//! let series = CatalogSeries::definitions(&[CatalogSeries::U]);
//! let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
//! let index = PayloadIndex::new(&series, &builder)?;
//! let report = AdvertisingAnalyzer::default().analyze_sequence(&ScanTranscript::default(), &index, None);
//! assert!(!report.passed());
//! # Ok::<(), advscope_errors::CatalogError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod batch;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod interval_check;
pub mod parser;
pub mod pipeline;
pub mod prelude;
pub mod schedule;
pub mod statistics;
pub mod transition;

pub use batch::Batch;
pub use capture::{BleAddress, DeviceCapture, PacketRecord, PayloadCapture, ScanTranscript};
pub use classifier::{BatchLabel, IntervalClassifier, IntervalPartition, most_likely_interval, rough_interval_ms};
pub use config::{AnalysisConfig, IntervalCheckConfig, IntervalFilterConfig, ParserConfig, ScheduleTolerances};
pub use diagnostics::{Diagnostic, DiscardReason, Discarded};
pub use interval_check::{IntervalChecker, IntervalReport, IntervalSummary};
pub use parser::{ParseOutcome, PayloadIndex, split_into_batches};
pub use pipeline::{AdvertisingAnalyzer, SequenceReport};
pub use schedule::{ScheduleChecker, SeriesVerdict, TimelineReport, classify_overlaps};
pub use statistics::{SequenceAnalysis, SequenceEntry, SeriesStatistics, collect_statistics};
pub use transition::{Transition, possible_transitions, split_at_transitions};
