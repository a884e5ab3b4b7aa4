//! Per-series statistics gathered from labeled batches.

use advscope_catalog::SeriesDefinition;
use serde::Serialize;
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::capture::hex;
use crate::classifier::{BatchLabel, IntervalClassifier, IntervalPartition};
use crate::diagnostics::Diagnostic;

/// Window timings and intervals observed for one series.
///
/// Times are seconds after the sequence origin. Window `i` spans
/// `start_time[i]..=end_time[i]`; `off_time[i]` is the gap between window
/// `i` and window `i + 1`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesStatistics {
    /// Series name
    pub series: String,
    /// First packet of each window
    pub start_time: Vec<f64>,
    /// Last packet of each window
    pub end_time: Vec<f64>,
    /// Duration of each window
    pub on_time: Vec<f64>,
    /// Silence between consecutive windows
    pub off_time: Vec<f64>,
    /// Good intervals, milliseconds
    pub intervals: Vec<f64>,
    /// Wrong intervals, milliseconds
    pub wrong_intervals: Vec<f64>,
    /// Good intervals scaled to one packet, milliseconds
    pub per_packet_intervals: Vec<f64>,
}

impl SeriesStatistics {
    /// Empty statistics for `series`.
    #[must_use]
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            ..Self::default()
        }
    }

    /// Whether no window was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_time.is_empty()
    }

    /// Number of windows observed.
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.start_time.len()
    }

    /// Add one window and its partitioned intervals.
    pub fn record_window(&mut self, start_s: f64, end_s: f64, partition: IntervalPartition) {
        if let Some(&previous_end) = self.end_time.last() {
            self.off_time.push(start_s - previous_end);
        }
        self.start_time.push(start_s);
        self.end_time.push(end_s);
        self.on_time.push(end_s - start_s);
        self.intervals.extend(partition.filtered);
        self.wrong_intervals.extend(partition.wrong);
        self.per_packet_intervals.extend(partition.per_packet);
    }

    /// Share of wrong intervals, 0 when nothing was measured.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "interval counts are small")]
    pub fn error_rate(&self) -> f64 {
        let total = self.intervals.len() + self.wrong_intervals.len();
        if total == 0 {
            return 0.0;
        }
        self.wrong_intervals.len() as f64 / total as f64
    }

    /// `(start, end)` of every window.
    pub fn windows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.start_time.iter().copied().zip(self.end_time.iter().copied())
    }

    /// Windows that start before `until_s` and end after `from_s`.
    #[must_use]
    pub fn overlapping_subset(&self, from_s: f64, until_s: f64) -> Vec<(f64, f64)> {
        self.windows()
            .filter(|&(start, end)| start < until_s && end > from_s)
            .collect()
    }
}

/// One labeled batch in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceEntry {
    /// Batch index
    pub batch: usize,
    /// Series index
    pub series: usize,
}

/// Statistics for every expected series plus how each batch was read.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SequenceAnalysis {
    /// One entry per expected series, in expected order
    pub statistics: Vec<SeriesStatistics>,
    /// Labeled batches in capture order
    pub sequence: Vec<SequenceEntry>,
    /// Findings that did not stop the analysis
    pub diagnostics: Vec<Diagnostic>,
    /// First timestamp of the first batch, nanoseconds
    pub origin_ns: Option<u64>,
}

impl SequenceAnalysis {
    /// Statistics of the series called `name`.
    #[must_use]
    pub fn statistics_for(&self, name: &str) -> Option<&SeriesStatistics> {
        self.statistics.iter().find(|s| s.series == name)
    }

    /// Series names in the order their batches were seen, consecutive repeats collapsed.
    #[must_use]
    pub fn observed_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::new();
        for entry in &self.sequence {
            let Some(name) = self.statistics.get(entry.series).map(|s| s.series.as_str()) else {
                continue;
            };
            if order.last() != Some(&name) {
                order.push(name);
            }
        }
        order
    }
}

/// Label every batch and fold it into its series' statistics.
///
/// Time zero is the first timestamp of the first batch.
#[must_use]
pub fn collect_statistics(
    batches: &[Batch],
    series: &[SeriesDefinition],
    classifier: &IntervalClassifier,
) -> SequenceAnalysis {
    let origin = batches.first().and_then(Batch::first_ns);
    let mut analysis = SequenceAnalysis {
        statistics: series.iter().map(|s| SeriesStatistics::new(s.name.clone())).collect(),
        origin_ns: origin,
        ..SequenceAnalysis::default()
    };
    let origin = origin.unwrap_or_default();
    let mut history: Vec<usize> = Vec::new();

    for (index, batch) in batches.iter().enumerate() {
        match classifier.label(batch, series, &history) {
            BatchLabel::Series { series: s, ambiguous } => {
                let (Some(def), Some(stats)) = (series.get(s), analysis.statistics.get_mut(s)) else {
                    continue;
                };
                if ambiguous {
                    warn!(batch = index, series = %def.name, "short batch labeled by default");
                    analysis.diagnostics.push(Diagnostic::AmbiguousLabel {
                        batch: index,
                        chosen: def.name.clone(),
                    });
                }
                let partition = classifier.filter(&batch.intervals_ms(), def.interval);
                if partition.reclassified_runs > 0 {
                    analysis.diagnostics.push(Diagnostic::LossRunReclassified {
                        batch: index,
                        runs: partition.reclassified_runs,
                    });
                }
                stats.record_window(batch.start_s(origin), batch.end_s(origin), partition);
                history.push(s);
                analysis.sequence.push(SequenceEntry { batch: index, series: s });
            }
            BatchLabel::Unclassifiable { rough_ms } => {
                warn!(
                    batch = index,
                    source = batch.source,
                    payload = %hex(&batch.payload),
                    rough_ms,
                    "batch matches no candidate interval"
                );
                analysis.diagnostics.push(Diagnostic::UnclassifiableBatch {
                    batch: index,
                    source: batch.source,
                    rough_ms,
                });
            }
        }
    }

    for stats in &analysis.statistics {
        debug!(
            series = %stats.series,
            windows = stats.window_count(),
            good = stats.intervals.len(),
            wrong = stats.wrong_intervals.len(),
            "series statistics"
        );
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(filtered: Vec<f64>, wrong: Vec<f64>) -> IntervalPartition {
        IntervalPartition {
            per_packet: filtered.clone(),
            filtered,
            wrong,
            reclassified_runs: 0,
        }
    }

    #[test]
    fn test_record_windows() {
        let mut stats = SeriesStatistics::new("C");
        stats.record_window(2.0, 3.9, partition(vec![100.0; 19], vec![]));
        stats.record_window(6.0, 7.9, partition(vec![100.0; 18], vec![150.0]));
        assert_eq!(stats.window_count(), 2);
        assert_eq!(stats.off_time.len(), 1);
        assert!(stats.off_time.first().is_some_and(|off| (off - 2.1).abs() < 1e-9));
        assert!(stats.on_time.iter().all(|on| (on - 1.9).abs() < 1e-9));
        assert!((stats.error_rate() - 1.0 / 38.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_subset() {
        let mut stats = SeriesStatistics::new("D");
        for k in 0..4 {
            let start = f64::from(k) * 6.28;
            stats.record_window(start, start + 1.28, IntervalPartition::default());
        }
        let subset = stats.overlapping_subset(1.0, 10.0);
        assert_eq!(subset.len(), 2);
    }

    #[test]
    fn test_empty_error_rate() {
        let stats = SeriesStatistics::new("A");
        assert!(stats.is_empty());
        assert!(stats.error_rate().abs() < f64::EPSILON);
    }
}
