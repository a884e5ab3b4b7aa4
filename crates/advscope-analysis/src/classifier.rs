//! Labeling batches with a series and sorting their intervals into good and wrong.
//!
//! Series sharing a payload differ by interval, so a batch is labeled from a
//! rough estimate of its interval: the median of its gaps, leaving out the
//! first one (the first gap after a window opens is less constrained by the
//! BLE timing rules). The estimate picks the candidate with the largest
//! nominal interval not above it.
//!
//! Filtering then reads every gap as a multiple `k` of the target interval:
//! `k == 1` is a good interval, `k >= 2` means `k - 1` packets were lost and
//! is kept scaled down to a per-packet interval. Anything else is wrong.

use advscope_catalog::{AdvertisingInterval, HDC_MAX_INTERVAL_MS, SeriesDefinition};
use serde::Serialize;
use tracing::trace;

use crate::batch::Batch;
use crate::config::IntervalFilterConfig;

/// Median of `values`, `None` when empty.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        let lo = sorted.get(mid.checked_sub(1)?)?;
        let hi = sorted.get(mid)?;
        Some((lo + hi) / 2.0)
    } else {
        sorted.get(mid).copied()
    }
}

/// Rough interval of a batch: median of every gap but the first.
///
/// `None` when the batch has fewer than two gaps.
#[must_use]
pub fn rough_interval_ms(intervals_ms: &[f64]) -> Option<f64> {
    match intervals_ms {
        [_, rest @ ..] if !rest.is_empty() => median(rest),
        _ => None,
    }
}

/// Index of the candidate with the largest nominal interval not above `rough_ms`.
///
/// High duty cycle compares as its nominal 3.5 ms. Ties keep the first candidate.
#[must_use]
pub fn most_likely_interval(rough_ms: f64, candidates: &[AdvertisingInterval]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, interval) in candidates.iter().enumerate() {
        let nominal = interval.nominal_ms();
        if nominal > rough_ms {
            continue;
        }
        if best.is_none_or(|(_, b)| nominal > b) {
            best = Some((i, nominal));
        }
    }
    best.map(|(i, _)| i)
}

/// Outcome of labeling one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchLabel {
    /// The batch belongs to this series
    Series {
        /// Index into the expected series list
        series: usize,
        /// Picked by default because nothing better was known
        ambiguous: bool,
    },
    /// No candidate interval is at or below the estimate
    Unclassifiable {
        /// Rough interval estimate, milliseconds
        rough_ms: f64,
    },
}

/// A batch's intervals sorted into good and wrong.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntervalPartition {
    /// Accepted gaps, milliseconds, in capture order
    pub filtered: Vec<f64>,
    /// Rejected gaps, milliseconds, in capture order
    pub wrong: Vec<f64>,
    /// Each accepted gap divided by its multiple
    pub per_packet: Vec<f64>,
    /// Loss runs too long to believe, moved to `wrong`
    pub reclassified_runs: usize,
}

impl IntervalPartition {
    /// Total gaps partitioned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filtered.len() + self.wrong.len()
    }

    /// Whether there was nothing to partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty() && self.wrong.is_empty()
    }

    fn accept(&mut self, interval: f64, multiple: u32) {
        self.filtered.push(interval);
        self.per_packet.push(interval / f64::from(multiple));
    }

    fn flush_run(&mut self, run: &mut Vec<(f64, u32)>, max_run: usize) {
        if run.len() > max_run {
            self.wrong.extend(run.iter().map(|(i, _)| *i));
            self.reclassified_runs = self.reclassified_runs.saturating_add(1);
        } else {
            for &(interval, multiple) in run.iter() {
                self.accept(interval, multiple);
            }
        }
        run.clear();
    }
}

/// Labels batches and filters their intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalClassifier {
    config: IntervalFilterConfig,
}

impl IntervalClassifier {
    /// Create a classifier.
    #[must_use]
    pub fn new(config: IntervalFilterConfig) -> Self {
        Self { config }
    }

    /// The filtering parameters.
    #[must_use]
    pub fn config(&self) -> &IntervalFilterConfig {
        &self.config
    }

    /// Label `batch` with one of its candidate series.
    ///
    /// `history` lists the series already labeled, oldest first; a batch too
    /// short for an estimate takes the most recent of its candidates found
    /// there, or its first candidate marked ambiguous.
    #[must_use]
    pub fn label(&self, batch: &Batch, series: &[SeriesDefinition], history: &[usize]) -> BatchLabel {
        let candidates = &batch.candidates;
        if let [only] = candidates.as_slice() {
            return BatchLabel::Series {
                series: *only,
                ambiguous: false,
            };
        }

        let intervals = batch.intervals_ms();
        if let Some(rough_ms) = rough_interval_ms(&intervals) {
            let known: Vec<(usize, AdvertisingInterval)> = candidates
                .iter()
                .filter_map(|&c| series.get(c).map(|s| (c, s.interval)))
                .collect();
            let intervals: Vec<AdvertisingInterval> = known.iter().map(|(_, i)| *i).collect();
            return match most_likely_interval(rough_ms, &intervals).and_then(|i| known.get(i)) {
                Some(&(series, _)) => BatchLabel::Series {
                    series,
                    ambiguous: false,
                },
                None => BatchLabel::Unclassifiable { rough_ms },
            };
        }

        if let Some(&recent) = history.iter().rev().find(|h| candidates.contains(h)) {
            return BatchLabel::Series {
                series: recent,
                ambiguous: false,
            };
        }
        match candidates.first() {
            Some(&first) => BatchLabel::Series {
                series: first,
                ambiguous: true,
            },
            None => BatchLabel::Unclassifiable { rough_ms: 0.0 },
        }
    }

    /// Multiple of `target` that `interval_ms` stands for, if any.
    #[must_use]
    pub fn multiple_of(&self, interval_ms: f64, target: AdvertisingInterval) -> Option<u32> {
        if target.is_high_duty_cycle() {
            let window = self.config.hdc_window_ms;
            if interval_ms > 0.0 && interval_ms <= HDC_MAX_INTERVAL_MS + window {
                return Some(1);
            }
            return (2..=self.config.hdc_max_multiple)
                .find(|&k| (interval_ms - f64::from(k) * HDC_MAX_INTERVAL_MS).abs() <= window);
        }
        let period = target.nominal_ms();
        let slack = period * self.config.relative_tolerance + self.config.adv_delay_ms;
        (1..=self.config.ldc_max_multiple).find(|&k| {
            let k = f64::from(k);
            (interval_ms - k * period).abs() <= k * slack
        })
    }

    /// Sort `intervals_ms` into good and wrong for the `target` interval.
    ///
    /// A run of more lost-packet gaps than the configured maximum is not
    /// believed to be packet loss and is counted wrong.
    #[must_use]
    pub fn filter(&self, intervals_ms: &[f64], target: AdvertisingInterval) -> IntervalPartition {
        let max_run = if target.is_high_duty_cycle() {
            self.config.max_consecutive_loss_hdc
        } else {
            self.config.max_consecutive_loss_ldc
        };
        let mut partition = IntervalPartition::default();
        let mut run: Vec<(f64, u32)> = Vec::new();

        for &interval in intervals_ms {
            match self.multiple_of(interval, target) {
                Some(k) if k >= 2 => run.push((interval, k)),
                Some(k) => {
                    partition.flush_run(&mut run, max_run);
                    partition.accept(interval, k);
                }
                None => {
                    partition.flush_run(&mut run, max_run);
                    partition.wrong.push(interval);
                }
            }
        }
        partition.flush_run(&mut run, max_run);

        trace!(
            target_interval = %target,
            good = partition.filtered.len(),
            wrong = partition.wrong.len(),
            "intervals filtered"
        );
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advscope_catalog::{PacketTemplate, PduType, Window};

    fn def(name: &str, interval: AdvertisingInterval) -> SeriesDefinition {
        SeriesDefinition {
            name: name.into(),
            start_s: 0.0,
            stop_s: 30.0,
            interval,
            window: Window::Continuous,
            packet_template: PacketTemplate::empty(),
            scan_response_template: PacketTemplate::empty(),
            pdu_type: PduType::ConnectableUndirected,
            stop_exempt_when_overlapped: false,
        }
    }

    fn batch(step_ms: u64, count: u64, candidates: Vec<usize>) -> Batch {
        Batch {
            source: 0,
            pdu_type: PduType::ConnectableUndirected,
            payload: vec![1],
            timestamps_ns: (0..count).map(|i| i * step_ms * 1_000_000).collect(),
            candidates,
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_rough_interval_skips_first() {
        assert_eq!(rough_interval_ms(&[500.0, 20.0, 20.0]), Some(20.0));
        assert_eq!(rough_interval_ms(&[20.0]), None);
    }

    #[test]
    fn test_most_likely_interval() {
        let c = [AdvertisingInterval::SHORT, AdvertisingInterval::LONG];
        assert_eq!(most_likely_interval(31.0, &c), Some(0));
        assert_eq!(most_likely_interval(100.0, &c), Some(1));
        assert_eq!(most_likely_interval(29.0, &c), None);
        assert_eq!(
            most_likely_interval(3.6, &[AdvertisingInterval::HighDutyCycle, AdvertisingInterval::SHORT]),
            Some(0)
        );
    }

    #[test]
    fn test_label_by_interval() {
        let series = vec![def("A", AdvertisingInterval::SHORT), def("B", AdvertisingInterval::LONG)];
        let classifier = IntervalClassifier::default();
        assert_eq!(
            classifier.label(&batch(100, 10, vec![0, 1]), &series, &[]),
            BatchLabel::Series {
                series: 1,
                ambiguous: false
            }
        );
        assert_eq!(
            classifier.label(&batch(30, 10, vec![0, 1]), &series, &[]),
            BatchLabel::Series {
                series: 0,
                ambiguous: false
            }
        );
        assert!(matches!(
            classifier.label(&batch(10, 10, vec![0, 1]), &series, &[]),
            BatchLabel::Unclassifiable { .. }
        ));
    }

    #[test]
    fn test_short_batch_falls_back() {
        let series = vec![def("A", AdvertisingInterval::SHORT), def("B", AdvertisingInterval::LONG)];
        let classifier = IntervalClassifier::default();
        let short = batch(100, 2, vec![0, 1]);
        assert_eq!(
            classifier.label(&short, &series, &[1, 0, 1]),
            BatchLabel::Series {
                series: 1,
                ambiguous: false
            }
        );
        assert_eq!(
            classifier.label(&short, &series, &[]),
            BatchLabel::Series {
                series: 0,
                ambiguous: true
            }
        );
    }

    #[test]
    fn test_filter_loss_multiples() {
        let classifier = IntervalClassifier::default();
        let partition = classifier.filter(&[20.0, 40.5, 19.0, 25.0, 61.0], AdvertisingInterval::EXTRA_SHORT);
        assert_eq!(partition.filtered, vec![20.0, 40.5, 19.0, 61.0]);
        assert_eq!(partition.wrong, vec![25.0]);
        assert_eq!(partition.per_packet, vec![20.0, 20.25, 19.0, 61.0 / 3.0]);
    }

    #[test]
    fn test_filter_hdc() {
        let classifier = IntervalClassifier::default();
        let partition = classifier.filter(&[3.75, 3.5, 7.5, 5.0], AdvertisingInterval::HighDutyCycle);
        assert_eq!(partition.filtered, vec![3.75, 3.5, 7.5]);
        assert_eq!(partition.wrong, vec![5.0]);
    }

    #[test]
    fn test_long_loss_run_is_wrong() {
        let classifier = IntervalClassifier::default();
        let mut intervals = vec![20.0];
        intervals.extend(std::iter::repeat_n(40.0, 11));
        intervals.push(20.0);
        let partition = classifier.filter(&intervals, AdvertisingInterval::EXTRA_SHORT);
        assert_eq!(partition.filtered, vec![20.0, 20.0]);
        assert_eq!(partition.wrong.len(), 11);
        assert_eq!(partition.reclassified_runs, 1);
    }

    #[test]
    fn test_adv_delay_widens_window() {
        let classifier = IntervalClassifier::new(IntervalFilterConfig {
            adv_delay_ms: 10.0,
            ..IntervalFilterConfig::default()
        });
        assert_eq!(classifier.multiple_of(31.0, AdvertisingInterval::EXTRA_SHORT), Some(1));
        assert_eq!(IntervalClassifier::default().multiple_of(31.0, AdvertisingInterval::EXTRA_SHORT), None);
    }
}
