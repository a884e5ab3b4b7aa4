//! Prelude module for convenient imports.

pub use crate::{
    AdvertisingAnalyzer, AnalysisConfig, Batch, BatchLabel, BleAddress, DeviceCapture, Diagnostic,
    DiscardReason, IntervalChecker, IntervalClassifier, IntervalPartition, IntervalReport,
    ParseOutcome, PayloadCapture, PayloadIndex, ScanTranscript, ScheduleChecker, SequenceAnalysis,
    SequenceReport, SeriesStatistics, SeriesVerdict, TimelineReport, collect_statistics,
    split_into_batches,
};
pub use advscope_errors::{AdvScopeError, Result};
