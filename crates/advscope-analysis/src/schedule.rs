//! Checking observed series statistics against the expected schedule.
//!
//! A series is either checked on its own or, when a higher-priority series
//! with a different window repetition shares part of its lifetime, against
//! the windows that series took from it. Every broken contract becomes a
//! [`ScheduleViolation`]; nothing here returns a bare boolean.

use advscope_catalog::SeriesDefinition;
use advscope_errors::{AdvScopeError, Bound, Contract, ScheduleError, ScheduleViolation};
use tracing::{debug, info};

use crate::config::ScheduleTolerances;
use crate::statistics::SeriesStatistics;

const REPETITION_EPSILON_S: f64 = 1e-9;

/// Verdict for one expected series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesVerdict {
    /// Series name
    pub series: String,
    /// Higher-priority series the checks were made against
    pub overlapped_by: Option<String>,
    /// Broken contracts, empty when the series passed
    pub violations: Vec<ScheduleViolation>,
}

impl SeriesVerdict {
    /// Whether no contract was broken.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Verdicts for every expected series, in expected order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineReport {
    /// One verdict per expected series
    pub verdicts: Vec<SeriesVerdict>,
}

impl TimelineReport {
    /// Whether every series passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(SeriesVerdict::passed)
    }

    /// Every violation, series by series.
    pub fn violations(&self) -> impl Iterator<Item = &ScheduleViolation> {
        self.verdicts.iter().flat_map(|v| v.violations.iter())
    }

    /// Verdict of the series called `name`.
    #[must_use]
    pub fn verdict(&self, name: &str) -> Option<&SeriesVerdict> {
        self.verdicts.iter().find(|v| v.series == name)
    }

    /// Turn a failing report into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AdvScopeError::Schedule`] listing every violation.
    pub fn ensure_passed(&self) -> Result<(), AdvScopeError> {
        if self.passed() {
            return Ok(());
        }
        Err(ScheduleError::Violations(self.violations().cloned().collect()).into())
    }
}

/// For each series, the later series that overlap it.
///
/// `B` overlaps `S` when it comes later in the list, their lifetimes
/// intersect and their window repetitions differ (continuous counts as 0).
#[must_use]
pub fn classify_overlaps(series: &[SeriesDefinition]) -> Vec<Vec<usize>> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            series
                .iter()
                .enumerate()
                .skip(i.saturating_add(1))
                .filter(|(_, b)| {
                    let intersect = !(b.start_s > s.stop_s || b.stop_s < s.start_s);
                    let repetition_differs =
                        (b.window.repetition_s() - s.window.repetition_s()).abs() > REPETITION_EPSILON_S;
                    intersect && repetition_differs
                })
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

/// Checks series statistics against their definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleChecker {
    tolerances: ScheduleTolerances,
    horizon_s: Option<f64>,
}

struct Ctx<'a> {
    def: &'a SeriesDefinition,
    stats: &'a SeriesStatistics,
    eps: f64,
    delta: f64,
    out: Vec<ScheduleViolation>,
}

impl Ctx<'_> {
    fn expect(&mut self, contract: Contract, observed: f64, bound: Bound) {
        if !bound.contains(observed) {
            self.out
                .push(ScheduleViolation::new(self.def.name.clone(), contract, observed, bound));
        }
    }

    fn around(&self, expected: f64) -> Bound {
        Bound::between(
            expected * (1.0 - self.eps) - self.delta,
            expected * (1.0 + self.eps) + self.delta,
        )
    }

    fn window(&self, nominal: f64) -> Bound {
        let slack = nominal * self.eps + self.delta;
        Bound::between(nominal - slack, nominal + slack)
    }
}

impl ScheduleChecker {
    /// Create a checker.
    #[must_use]
    pub fn new(tolerances: ScheduleTolerances) -> Self {
        Self {
            tolerances,
            horizon_s: None,
        }
    }

    /// Only hold series to what a capture ending at `horizon_s` can show.
    ///
    /// Stop times after the horizon are not checked, neither is the last
    /// window of a series still alive at the horizon, and series starting
    /// after it are not expected at all.
    #[must_use]
    pub fn with_horizon(mut self, horizon_s: Option<f64>) -> Self {
        self.horizon_s = horizon_s;
        self
    }

    /// The tolerances in use.
    #[must_use]
    pub fn tolerances(&self) -> &ScheduleTolerances {
        &self.tolerances
    }

    fn cut_by_horizon(&self, t_s: f64) -> bool {
        self.horizon_s.is_some_and(|h| t_s > h)
    }

    /// Check every expected series.
    ///
    /// Statistics are matched to series by name; a series without
    /// statistics, or with none observed, fails with
    /// [`Contract::EmptyStatistics`]. Checking is pure.
    #[must_use]
    pub fn check_timeline(&self, statistics: &[SeriesStatistics], series: &[SeriesDefinition]) -> TimelineReport {
        let overlaps = classify_overlaps(series);
        let find = |name: &str| statistics.iter().find(|s| s.series == name);
        let empty = SeriesStatistics::default();

        let verdicts: Vec<SeriesVerdict> = series
            .iter()
            .zip(&overlaps)
            .map(|(def, overlappers)| {
                let overlapper = overlappers.first().and_then(|&o| series.get(o));
                let mut verdict = SeriesVerdict {
                    series: def.name.clone(),
                    overlapped_by: overlapper.map(|o| o.name.clone()),
                    violations: Vec::new(),
                };
                if self.cut_by_horizon(def.start_s) {
                    return verdict;
                }
                let Some(stats) = find(&def.name).filter(|s| !s.is_empty()) else {
                    verdict.violations.push(ScheduleViolation::new(
                        def.name.clone(),
                        Contract::EmptyStatistics,
                        0.0,
                        Bound::default(),
                    ));
                    return verdict;
                };

                let mut ctx = Ctx {
                    def,
                    stats,
                    eps: self.tolerances.series_timing,
                    delta: self.tolerances.window_loss_s(def.interval.nominal_ms()),
                    out: Vec::new(),
                };
                if overlappers.len() > 1 {
                    #[expect(clippy::cast_precision_loss, reason = "series counts are small")]
                    let count = overlappers.len() as f64;
                    ctx.expect(Contract::UnsupportedOverlap, count, Bound::at_most(1.0));
                }
                match overlapper {
                    None => self.check_alone(&mut ctx),
                    Some(o) => {
                        let o_stats = find(&o.name).unwrap_or(&empty);
                        self.check_overlapped(&mut ctx, o_stats);
                    }
                }
                verdict.violations = ctx.out;
                verdict
            })
            .collect();

        let report = TimelineReport { verdicts };
        for verdict in &report.verdicts {
            debug!(
                series = %verdict.series,
                overlapped_by = verdict.overlapped_by.as_deref().unwrap_or("-"),
                violations = verdict.violations.len(),
                "series checked"
            );
        }
        info!(
            series = report.verdicts.len(),
            passed = report.passed(),
            violations = report.violations().count(),
            "timeline checked"
        );
        report
    }

    fn check_error_rate(&self, ctx: &mut Ctx<'_>) {
        let rate = ctx.stats.error_rate();
        if rate >= self.tolerances.error_rate {
            ctx.out.push(ScheduleViolation::new(
                ctx.def.name.clone(),
                Contract::IntervalErrorRate,
                rate,
                Bound::at_most(self.tolerances.error_rate),
            ));
        }
    }

    fn check_stop(&self, ctx: &mut Ctx<'_>) {
        if self.cut_by_horizon(ctx.def.stop_s) {
            return;
        }
        if let Some(&last_end) = ctx.stats.end_time.last() {
            let bound = ctx.around(ctx.def.stop_s);
            ctx.expect(Contract::StopTime, last_end, bound);
        }
    }

    /// On-times worth checking: the last window may be cut by the horizon.
    fn checked_on_times<'s>(&self, ctx: &Ctx<'s>) -> &'s [f64] {
        let on = ctx.stats.on_time.as_slice();
        if self.cut_by_horizon(ctx.def.stop_s) {
            on.split_last().map_or(on, |(_, rest)| rest)
        } else {
            on
        }
    }

    fn check_alone(&self, ctx: &mut Ctx<'_>) {
        self.check_error_rate(ctx);

        if let Some(&first_start) = ctx.stats.start_time.first() {
            let start = ctx.def.start_s;
            let bound = Bound::between(start * (1.0 - ctx.eps), start * (1.0 + ctx.eps));
            ctx.expect(Contract::StartTime, first_start, bound);
        }
        self.check_stop(ctx);

        match (ctx.def.window.on_s(), ctx.def.window.is_duty_cycled()) {
            (Some(w_on), true) => {
                let on_bound = ctx.window(w_on);
                for (index, &on) in self.checked_on_times(ctx).iter().enumerate() {
                    ctx.expect(Contract::WindowOnTime { index }, on, on_bound);
                }
                let off_bound = ctx.window(ctx.def.window.off_s());
                let stats = ctx.stats;
                for (index, &off) in stats.off_time.iter().enumerate() {
                    ctx.expect(Contract::WindowOffTime { index }, off, off_bound);
                }
            }
            _ => {
                #[expect(clippy::cast_precision_loss, reason = "window counts are small")]
                let windows = ctx.stats.window_count() as f64;
                ctx.expect(Contract::ContinuousWindowCount, windows, Bound::exactly(1.0));
            }
        }
    }

    fn check_overlapped(&self, ctx: &mut Ctx<'_>, overlapper: &SeriesStatistics) {
        self.check_error_rate(ctx);

        let def = ctx.def;
        let stats = ctx.stats;
        let first_start = stats.start_time.first().copied().unwrap_or(def.start_s);
        let last_end = stats.end_time.last().copied().unwrap_or(def.stop_s);
        let windows = overlapper.overlapping_subset(first_start.min(def.start_s), last_end.max(def.stop_s));

        // every window of O counts here, including those over before S started
        let early: Vec<(f64, f64)> = overlapper
            .windows()
            .filter(|(start, _)| *start <= def.start_s * (1.0 + ctx.eps))
            .collect();
        let t0 = early
            .iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(0.0, |(_, end)| *end);
        let expected_start = if early.len() == 1 {
            def.start_s + t0
        } else {
            def.start_s.max(t0)
        };
        let bound = ctx.around(expected_start);
        ctx.expect(Contract::StartTime, first_start, bound);

        if !def.stop_exempt_when_overlapped {
            self.check_stop(ctx);
        }

        let intersecting = |index: usize| -> Vec<(f64, f64)> {
            let (Some(&off_start), Some(&off_end)) = (
                stats.end_time.get(index),
                stats.start_time.get(index.saturating_add(1)),
            ) else {
                return Vec::new();
            };
            windows
                .iter()
                .copied()
                .filter(|&(start, end)| start < off_end && end > off_start)
                .collect()
        };
        let off_periods: Vec<(usize, f64, Vec<(f64, f64)>)> = stats
            .off_time
            .iter()
            .enumerate()
            .map(|(i, &off)| (i, off, intersecting(i)))
            .collect();

        match (def.window.on_s(), def.window.is_duty_cycled()) {
            (Some(w_on), true) => {
                let on_bound = Bound::at_most(w_on * (1.0 + ctx.eps) + ctx.delta);
                for (index, &on) in self.checked_on_times(ctx).iter().enumerate() {
                    ctx.expect(Contract::WindowOnTime { index }, on, on_bound);
                }
                let w_off = def.window.off_s();
                for (index, off, hits) in off_periods {
                    let taken = hits.first().map_or(0.0, |(start, end)| end - start);
                    let bound = Bound::at_most((w_off + taken) * (1.0 + ctx.eps) + ctx.delta);
                    ctx.expect(Contract::WindowOffTime { index }, off, bound);
                }
            }
            _ => {
                for (index, off, hits) in off_periods {
                    match hits.as_slice() {
                        [(start, end)] => {
                            let taken = end - start;
                            let bound = Bound::between(taken - ctx.delta, taken + ctx.delta);
                            ctx.expect(Contract::WindowOffTime { index }, off, bound);
                        }
                        _ => {
                            #[expect(clippy::cast_precision_loss, reason = "window counts are small")]
                            let count = hits.len() as f64;
                            ctx.expect(Contract::OverlapResolution { index }, count, Bound::exactly(1.0));
                        }
                    }
                }
            }
        }
    }
}
