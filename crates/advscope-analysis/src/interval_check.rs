//! Per-interval assertion over a set of batches.
//!
//! Unlike the schedule checker this ignores which series a batch belongs to:
//! every batch is matched to the most likely of the expected intervals and
//! the intervals are judged as a whole.

use advscope_catalog::{AdvertisingInterval, HDC_MAX_INTERVAL_MS};
use advscope_errors::AssertionFailure;
use serde::Serialize;
use tracing::{debug, info};

use crate::batch::Batch;
use crate::capture::hex;
use crate::classifier::{IntervalClassifier, most_likely_interval, rough_interval_ms};
use crate::config::{IntervalCheckConfig, IntervalFilterConfig};

/// Intervals gathered for one expected interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalSummary {
    /// The expected interval
    pub interval: AdvertisingInterval,
    /// Batches matched to it
    pub batches: usize,
    /// Good intervals, milliseconds
    pub good: Vec<f64>,
    /// Good intervals scaled to one packet, milliseconds
    pub per_packet: Vec<f64>,
    /// Wrong intervals, milliseconds
    pub wrong: Vec<f64>,
}

impl IntervalSummary {
    fn new(interval: AdvertisingInterval) -> Self {
        Self {
            interval,
            batches: 0,
            good: Vec::new(),
            per_packet: Vec::new(),
            wrong: Vec::new(),
        }
    }

    /// Mean per-packet interval, milliseconds.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "interval counts are small")]
    pub fn mean_per_packet_ms(&self) -> Option<f64> {
        if self.per_packet.is_empty() {
            return None;
        }
        Some(self.per_packet.iter().sum::<f64>() / self.per_packet.len() as f64)
    }
}

/// Outcome of a passing interval check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalReport {
    /// One summary per distinct expected interval
    pub summaries: Vec<IntervalSummary>,
    /// Whether every interval was held to the wrong-interval budget
    pub check_all: bool,
}

/// Checks captured intervals against a set of expected intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalChecker {
    classifier: IntervalClassifier,
    config: IntervalCheckConfig,
}

impl IntervalChecker {
    /// Create a checker.
    #[must_use]
    pub fn new(filter: IntervalFilterConfig, config: IntervalCheckConfig) -> Self {
        Self {
            classifier: IntervalClassifier::new(filter),
            config,
        }
    }

    /// Match every batch to an expected interval and judge the result.
    ///
    /// With `check_all`, each interval may have at most the configured number
    /// of wrong intervals. Otherwise the mean per-packet interval must sit at
    /// the expected interval plus half the advertising delay, within the
    /// average tolerance; high duty cycle only needs a mean at or below 3.75 ms.
    ///
    /// # Errors
    ///
    /// Returns the first failure found: an unclassifiable batch, an expected
    /// interval never seen, or an interval out of specification.
    pub fn check(
        &self,
        batches: &[Batch],
        expected: &[AdvertisingInterval],
        check_all: bool,
    ) -> Result<IntervalReport, AssertionFailure> {
        let mut distinct: Vec<AdvertisingInterval> = Vec::new();
        for interval in expected {
            if !distinct.contains(interval) {
                distinct.push(*interval);
            }
        }
        let mut summaries: Vec<IntervalSummary> = distinct.iter().copied().map(IntervalSummary::new).collect();

        for batch in batches {
            let intervals = batch.intervals_ms();
            let Some(rough_ms) = rough_interval_ms(&intervals).or_else(|| intervals.first().copied()) else {
                continue;
            };
            let Some(summary) = most_likely_interval(rough_ms, &distinct).and_then(|i| summaries.get_mut(i)) else {
                return Err(AssertionFailure::UnclassifiableBatch {
                    source_id: batch.source,
                    payload: hex(&batch.payload),
                    rough_ms,
                });
            };
            let partition = self.classifier.filter(&intervals, summary.interval);
            summary.batches = summary.batches.saturating_add(1);
            summary.good.extend(partition.filtered);
            summary.per_packet.extend(partition.per_packet);
            summary.wrong.extend(partition.wrong);
        }

        for summary in &summaries {
            self.judge(summary, check_all)?;
        }
        info!(intervals = summaries.len(), check_all, "advertising intervals within specification");
        Ok(IntervalReport { summaries, check_all })
    }

    fn judge(&self, summary: &IntervalSummary, check_all: bool) -> Result<(), AssertionFailure> {
        let label = summary.interval.to_string();
        let Some(mean) = summary.mean_per_packet_ms() else {
            return Err(AssertionFailure::MissingInterval { interval: label });
        };
        debug!(
            interval = %label,
            batches = summary.batches,
            good = summary.good.len(),
            wrong = summary.wrong.len(),
            mean_ms = mean,
            "interval summary"
        );

        if check_all {
            if summary.wrong.len() > self.config.wrong_interval_tolerance {
                return Err(AssertionFailure::interval_spec(
                    label,
                    format!(
                        "{} wrong interval(s), at most {} allowed: {:?}",
                        summary.wrong.len(),
                        self.config.wrong_interval_tolerance,
                        summary.wrong
                    ),
                ));
            }
            return Ok(());
        }

        if summary.interval.is_high_duty_cycle() {
            if mean > HDC_MAX_INTERVAL_MS {
                return Err(AssertionFailure::interval_spec(
                    label,
                    format!("mean {mean:.3} ms above {HDC_MAX_INTERVAL_MS} ms"),
                ));
            }
            return Ok(());
        }

        let target = summary.interval.nominal_ms() + self.classifier.config().adv_delay_ms / 2.0;
        if (mean - target).abs() > self.config.average_tolerance_ms {
            return Err(AssertionFailure::interval_spec(
                label,
                format!(
                    "mean {mean:.3} ms, expected {target:.3} ms +/- {} ms",
                    self.config.average_tolerance_ms
                ),
            ));
        }
        Ok(())
    }
}
