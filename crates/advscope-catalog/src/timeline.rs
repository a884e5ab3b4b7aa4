//! Expected priority timeline and scan-time helpers.
//!
//! The expected list is ordered by priority: when two series want the radio
//! at the same time, the later one wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::SeriesDefinition;

/// A stretch of time during which one series is the highest-priority active one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    /// Index into the expected series list
    pub series: usize,
    /// Segment start, seconds
    pub start_s: f64,
    /// Segment end, seconds
    pub stop_s: f64,
}

impl TimelineSegment {
    /// Segment length in seconds.
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        self.stop_s - self.start_s
    }
}

/// Every instant at which a series may switch on or off, up to `horizon_s`.
fn transition_times(series: &[SeriesDefinition], horizon_s: f64) -> Vec<f64> {
    let mut times = vec![0.0];
    for s in series {
        let stop = s.stop_s.min(horizon_s);
        times.push(s.start_s.min(horizon_s));
        times.push(stop);
        if let Some(on_s) = s.window.on_s() {
            let period = s.window.repetition_s();
            if period <= 0.0 {
                continue;
            }
            let mut k = 0u32;
            loop {
                let window_start = s.start_s + f64::from(k) * period;
                if window_start >= stop {
                    break;
                }
                times.push(window_start);
                times.push((window_start + on_s).min(stop));
                k = k.saturating_add(1);
            }
        }
    }
    times.retain(|t| t.is_finite() && *t <= horizon_s);
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    times
}

/// Expected timeline of `series` up to `horizon_s` (or the last stop time).
///
/// Returns the ordered segments during which each series is the
/// highest-priority active one. Adjacent segments of the same series are
/// merged; silent gaps produce no segment.
#[must_use]
pub fn expected_timeline(series: &[SeriesDefinition], horizon_s: Option<f64>) -> Vec<TimelineSegment> {
    let last_stop = series.iter().map(|s| s.stop_s).fold(0.0, f64::max);
    let horizon = horizon_s.map_or(last_stop, |h| h.min(last_stop));
    let times = transition_times(series, horizon);

    let mut segments: Vec<TimelineSegment> = Vec::new();
    for pair in times.windows(2) {
        let [t0, t1] = pair else { continue };
        if t1 - t0 <= 0.0 {
            continue;
        }
        let mid = (t0 + t1) / 2.0;
        let Some(winner) = series.iter().rposition(|s| s.is_active_at(mid)) else {
            continue;
        };
        match segments.last_mut() {
            Some(last) if last.series == winner && (last.stop_s - t0).abs() < 1e-9 => {
                last.stop_s = *t1;
            }
            _ => segments.push(TimelineSegment {
                series: winner,
                start_s: *t0,
                stop_s: *t1,
            }),
        }
    }
    debug!(segments = segments.len(), horizon_s = horizon, "expected timeline built");
    segments
}

/// Scan time covering the whole advertising of `series`, capped to `max_s`.
///
/// Series starting at or after the cap are ignored.
#[must_use]
pub fn scan_time(series: &[SeriesDefinition], max_s: Option<f64>) -> f64 {
    let max = max_s.unwrap_or(f64::INFINITY);
    series
        .iter()
        .filter(|s| s.start_s < max)
        .map(|s| max.min(s.stop_s))
        .fold(0.0, f64::max)
}

/// Scan time covering one window of every series, capped to `max_s`.
#[must_use]
pub fn scan_time_one_window_each(series: &[SeriesDefinition], max_s: Option<f64>) -> f64 {
    let max = max_s.unwrap_or(f64::INFINITY);
    series
        .iter()
        .filter(|s| s.start_s < max)
        .map(|s| {
            let first_window_end = if s.window.is_duty_cycled() {
                s.start_s + s.window.repetition_s()
            } else {
                s.stop_s
            };
            max.min(first_window_end)
        })
        .fold(0.0, f64::max)
}

/// Scan time until every series has produced `count` intervals, capped to `max_s`.
///
/// Walks the expected timeline, crediting each segment with
/// `duration / period` intervals for its series, and stops in the segment
/// where the last series reaches `count`, trimming the excess.
#[must_use]
pub fn scan_time_for_interval_count(series: &[SeriesDefinition], count: u32, max_s: Option<f64>) -> f64 {
    let max = max_s.unwrap_or(f64::INFINITY);
    let target = f64::from(count);
    let mut credited = vec![0.0_f64; series.len()];
    let mut duration = 0.0_f64;

    for segment in expected_timeline(series, None) {
        if segment.start_s >= max {
            break;
        }
        let Some(def) = series.get(segment.series) else {
            continue;
        };
        let period_s = def.interval.period_ms() / 1e3;
        let Some(slot) = credited.get_mut(segment.series) else {
            continue;
        };
        *slot += segment.duration_s() / period_s;
        duration = segment.stop_s;

        if credited.iter().all(|&c| c >= target) {
            let excess = credited.get(segment.series).map_or(0.0, |c| c - target);
            duration -= excess * period_s;
            break;
        }
    }
    duration.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::CatalogSeries;

    fn names(series: &[SeriesDefinition], segments: &[TimelineSegment]) -> Vec<String> {
        segments
            .iter()
            .filter_map(|seg| series.get(seg.series).map(|s| s.name.clone()))
            .collect()
    }

    #[test]
    fn test_scan_time() {
        let abc = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        assert!((scan_time(&abc, None) - 180.0).abs() < 1e-9);
        assert!((scan_time(&abc, Some(40.0)) - 40.0).abs() < 1e-9);
        let a_only = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B]);
        assert!((scan_time(&a_only, Some(32.0)) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_time_one_window_each() {
        let abc = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        // B: 32 + 4
        assert!((scan_time_one_window_each(&abc, None) - 36.0).abs() < 1e-9);
        let ef = CatalogSeries::definitions(&[CatalogSeries::E, CatalogSeries::F]);
        assert!((scan_time_one_window_each(&ef, None) - 180.0).abs() < 1e-9);
        assert!((scan_time_one_window_each(&ef, Some(60.0)) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_interlaced_timeline() {
        let abc = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        let segments = expected_timeline(&abc, Some(8.0));
        assert_eq!(names(&abc, &segments), vec!["A", "C", "A", "C"]);
        assert!(segments.iter().all(|s| (s.duration_s() - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_higher_priority_preempts_continuous() {
        let ed = CatalogSeries::definitions(&[CatalogSeries::E, CatalogSeries::D]);
        let segments = expected_timeline(&ed, Some(7.0));
        assert_eq!(names(&ed, &segments), vec!["D", "E", "D"]);
        let first = segments.first().map(|s| s.stop_s);
        assert_eq!(first.map(|v| (v - 1.28).abs() < 1e-9), Some(true));
    }

    #[test]
    fn test_back_to_back_windows_merge() {
        let g = CatalogSeries::definitions(&[CatalogSeries::G]);
        let segments = expected_timeline(&g, None);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments.first().map(|s| (s.stop_s - 5.0).abs() < 1e-9), Some(true));
    }

    #[test]
    fn test_interval_count() {
        let eh = CatalogSeries::definitions(&[CatalogSeries::E]);
        // 30 ms interval, 100 intervals
        let t = scan_time_for_interval_count(&eh, 100, None);
        assert!((t - 3.0).abs() < 1e-6, "{t}");
        let abc = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        // B needs 10 intervals of 100 ms in its first window at 32 s
        let t = scan_time_for_interval_count(&abc, 10, None);
        assert!((t - 33.0).abs() < 1e-6, "{t}");
    }

    #[test]
    fn test_interval_count_capped() {
        let abc = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
        assert!((scan_time_for_interval_count(&abc, 10, Some(20.0)) - 20.0).abs() < 1e-9);
    }
}
