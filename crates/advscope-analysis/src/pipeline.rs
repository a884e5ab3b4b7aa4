//! The whole offline analysis: transcript in, verdict out.

use advscope_catalog::{AdvertisingInterval, SeriesDefinition};
use advscope_errors::{AdvScopeError, AssertionFailure};
use tracing::{debug, info};

use crate::capture::ScanTranscript;
use crate::classifier::IntervalClassifier;
use crate::config::AnalysisConfig;
use crate::diagnostics::Diagnostic;
use crate::interval_check::{IntervalChecker, IntervalReport};
use crate::parser::{ParseOutcome, PayloadIndex, split_into_batches};
use crate::schedule::{ScheduleChecker, TimelineReport};
use crate::statistics::{SequenceAnalysis, collect_statistics};

/// Everything learned from one transcript about one expected sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    /// Batches and dropped records
    pub parse: ParseOutcome,
    /// Labels, statistics and classifier findings
    pub analysis: SequenceAnalysis,
    /// Schedule verdicts
    pub timeline: TimelineReport,
}

impl SequenceReport {
    /// Whether every series passed its schedule.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.timeline.passed()
    }

    /// Parser and classifier findings together.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.parse
            .discarded
            .iter()
            .cloned()
            .map(Diagnostic::Discarded)
            .chain(self.analysis.diagnostics.iter().cloned())
            .collect()
    }

    /// Turn a failing report into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AdvScopeError::Schedule`] when a series broke its schedule.
    pub fn ensure_passed(&self) -> Result<(), AdvScopeError> {
        self.timeline.ensure_passed()
    }
}

/// Runs parser, classifier and checkers with one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvertisingAnalyzer {
    config: AnalysisConfig,
}

impl AdvertisingAnalyzer {
    /// Create an analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: AnalysisConfig) -> Result<Self, AdvScopeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Split a transcript into batches.
    #[must_use]
    pub fn parse(&self, transcript: &ScanTranscript, index: &PayloadIndex<'_>) -> ParseOutcome {
        split_into_batches(transcript, index, &self.config.parser)
    }

    /// Check a transcript against the series `index` was built from.
    ///
    /// `horizon_s`, when given, is the capture length measured from the
    /// first batch; see [`ScheduleChecker::with_horizon`].
    #[must_use]
    pub fn analyze_sequence(
        &self,
        transcript: &ScanTranscript,
        index: &PayloadIndex<'_>,
        horizon_s: Option<f64>,
    ) -> SequenceReport {
        let series: &[SeriesDefinition] = index.series();
        let parse = self.parse(transcript, index);
        let classifier = IntervalClassifier::new(self.config.filter);
        let analysis = collect_statistics(&parse.batches, series, &classifier);
        debug!(order = ?analysis.observed_order(), "observed sequence");
        let timeline = ScheduleChecker::new(self.config.schedule)
            .with_horizon(horizon_s)
            .check_timeline(&analysis.statistics, series);
        info!(
            series = series.len(),
            batches = parse.batches.len(),
            passed = timeline.passed(),
            "sequence analyzed"
        );
        SequenceReport {
            parse,
            analysis,
            timeline,
        }
    }

    /// Check the intervals of a transcript against the intervals of the expected series.
    ///
    /// # Errors
    ///
    /// Returns the first interval failure, see [`IntervalChecker::check`].
    pub fn check_intervals(
        &self,
        transcript: &ScanTranscript,
        index: &PayloadIndex<'_>,
        check_all: bool,
    ) -> Result<IntervalReport, AssertionFailure> {
        let parse = self.parse(transcript, index);
        let expected: Vec<AdvertisingInterval> = index.series().iter().map(|s| s.interval).collect();
        IntervalChecker::new(self.config.filter, self.config.interval_check).check(&parse.batches, &expected, check_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use advscope_catalog::{CatalogSeries, DeviceProfile, TemplatePayloadBuilder};
    use advscope_errors::CatalogError;

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            parser: ParserConfig {
                min_batch_len: 0,
                ..ParserConfig::default()
            },
            ..AnalysisConfig::default()
        };
        assert!(matches!(AdvertisingAnalyzer::new(config), Err(AdvScopeError::Validation(_))));
    }

    #[test]
    fn test_empty_transcript_fails_every_series() -> Result<(), CatalogError> {
        let series = CatalogSeries::definitions(&[CatalogSeries::U]);
        let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
        let index = PayloadIndex::new(&series, &builder)?;
        let report = AdvertisingAnalyzer::default().analyze_sequence(&ScanTranscript::default(), &index, None);
        assert!(!report.passed());
        assert!(report.diagnostics().is_empty());
        Ok(())
    }
}
