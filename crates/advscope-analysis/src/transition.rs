//! Splitting a batch where the DUT changed interval but kept its payload.
//!
//! Series sharing a payload (Swift Pair at 30 ms then at 100 ms, say) reach
//! the parser as one uninterrupted run. A moving average of the intervals
//! crossing a threshold between the two periods locates the change; the
//! exact cut is the last interval closer to the old period than the new one.

use advscope_catalog::SeriesDefinition;

const AVERAGE_WINDOW: usize = 10;
const STABILITY_LENGTH: usize = 10;
const STABILITY_MIN: usize = 8;
const ZONE_BEFORE: usize = 12;
const ZONE_AFTER: usize = 6;
const RISING_LEVEL: f64 = 0.8;
const MIN_SPLIT_SPAN_NS: u64 = 100_000_000;

/// A change of interval a shared payload may go through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Period before the change, milliseconds
    pub from_ms: f64,
    /// Period after the change, milliseconds
    pub to_ms: f64,
    from_hdc: bool,
    to_hdc: bool,
}

struct Located {
    crossing: usize,
    last_before: usize,
}

impl Transition {
    fn between(from: &SeriesDefinition, to: &SeriesDefinition) -> Self {
        Self {
            from_ms: from.interval.period_ms(),
            to_ms: to.interval.period_ms(),
            from_hdc: from.interval.is_high_duty_cycle(),
            to_hdc: to.interval.is_high_duty_cycle(),
        }
    }

    fn rising(&self) -> bool {
        self.from_ms < self.to_ms
    }

    fn threshold_ms(&self) -> f64 {
        let level = if self.from_hdc {
            0.5
        } else if self.to_hdc {
            0.75
        } else if self.rising() {
            RISING_LEVEL
        } else {
            1.0 - RISING_LEVEL
        };
        (self.to_ms - self.from_ms).abs() * level + self.from_ms.min(self.to_ms)
    }

    /// First stable crossing of the moving average in the right direction,
    /// then the last interval around it still closer to `from_ms`.
    fn locate(&self, intervals_ms: &[f64]) -> Option<Located> {
        let threshold = self.threshold_ms();
        let above: Vec<bool> = moving_average(intervals_ms, AVERAGE_WINDOW)
            .into_iter()
            .map(|avg| avg > threshold)
            .collect();
        let after = self.rising();

        let crossing = above.windows(2).enumerate().find_map(|(j, pair)| {
            let [now, next] = pair else {
                return None;
            };
            if *now == after || *next != after {
                return None;
            }
            let settled = above
                .iter()
                .skip(j + 1)
                .take(STABILITY_LENGTH)
                .filter(|&&a| a == after)
                .count();
            let remaining = above.len() - 1 - j;
            (settled >= STABILITY_MIN.min(remaining)).then_some(j + AVERAGE_WINDOW - 1)
        })?;

        let start = crossing.saturating_sub(ZONE_BEFORE);
        let end = (crossing + ZONE_AFTER).min(intervals_ms.len());
        let last_before = intervals_ms
            .get(start..end)?
            .iter()
            .rposition(|&i| closeness(i, self.from_ms) < closeness(i, self.to_ms))
            .map_or(start, |offset| start + offset);
        Some(Located { crossing, last_before })
    }
}

/// How far `interval_ms` is from a whole multiple of `period_ms`, 1 when below one period.
fn closeness(interval_ms: f64, period_ms: f64) -> f64 {
    let ratio = interval_ms / period_ms;
    let multiple = ratio.round();
    if multiple < 1.0 { 1.0 } else { (ratio - multiple).abs() }
}

fn moving_average(values: &[f64], n: usize) -> Vec<f64> {
    #[expect(clippy::cast_precision_loss, reason = "window is 10")]
    let len = n as f64;
    values.windows(n).map(|w| w.iter().sum::<f64>() / len).collect()
}

/// Interval changes the series in `candidates` can go through: from a series
/// to one with another interval starting no earlier.
#[must_use]
pub fn possible_transitions(series: &[SeriesDefinition], candidates: &[usize]) -> Vec<Transition> {
    let defs: Vec<&SeriesDefinition> = candidates.iter().filter_map(|&i| series.get(i)).collect();
    let mut out: Vec<Transition> = Vec::new();
    for a in &defs {
        for b in &defs {
            if a.start_s <= b.start_s && a.interval != b.interval {
                let t = Transition::between(a, b);
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
    }
    out
}

/// Cut `timestamps_ns` wherever one of `transitions` happened.
///
/// Every timestamp ends up in exactly one piece. Runs shorter than 100 ms
/// are never cut.
#[must_use]
pub fn split_at_transitions(timestamps_ns: Vec<u64>, transitions: &[Transition]) -> Vec<Vec<u64>> {
    let mut pieces = Vec::new();
    let mut rest = timestamps_ns;
    loop {
        let span = match (rest.first(), rest.last()) {
            (Some(first), Some(last)) => last.saturating_sub(*first),
            _ => 0,
        };
        if transitions.is_empty() || span < MIN_SPLIT_SPAN_NS {
            pieces.push(rest);
            break;
        }
        let intervals: Vec<f64> = rest
            .windows(2)
            .map(|w| match w {
                [a, b] => crate::capture::nanos_to_ms(b.saturating_sub(*a)),
                _ => 0.0,
            })
            .collect();
        let Some(found) = transitions
            .iter()
            .filter_map(|t| t.locate(&intervals))
            .min_by_key(|l| l.crossing)
        else {
            pieces.push(rest);
            break;
        };
        let cut = (found.last_before + 2).min(rest.len());
        let tail = rest.split_off(cut);
        pieces.push(rest);
        if tail.is_empty() {
            break;
        }
        rest = tail;
    }
    pieces
}
