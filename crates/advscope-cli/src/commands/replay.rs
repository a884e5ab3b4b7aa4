//! Replaying recorded scans through the analysis

use std::path::Path;

use advscope_analysis::AdvertisingAnalyzer;
use anyhow::Result;
use tracing::{info, warn};

use crate::commands::{TranscriptArgs, Verdict};
use crate::input::{PayloadSource, load_config, load_transcript, series_definitions};
use crate::output;

/// Check the schedule of every expected series.
pub fn sequence(input: &TranscriptArgs, horizon_s: Option<f64>, json: bool) -> Result<Verdict> {
    let series = series_definitions(&input.series)?;
    let analyzer = AdvertisingAnalyzer::new(load_config(input.config.as_deref())?)?;
    let transcript = load_transcript(&input.transcript)?;
    let source = PayloadSource::resolve(input.profile.as_deref(), input.address.as_deref(), &transcript)?;
    let index = source.index(&series)?;

    let report = analyzer.analyze_sequence(&transcript, &index, horizon_s);
    for diagnostic in report.diagnostics() {
        warn!(%diagnostic, "sequence diagnostic");
    }
    output::print_sequence(&report, json);
    Ok(Verdict::from_passed(report.passed()))
}

/// Check the intervals against the intervals of the expected series.
pub fn interval(input: &TranscriptArgs, check_all: bool, json: bool) -> Result<Verdict> {
    let series = series_definitions(&input.series)?;
    let analyzer = AdvertisingAnalyzer::new(load_config(input.config.as_deref())?)?;
    let transcript = load_transcript(&input.transcript)?;
    let source = PayloadSource::resolve(input.profile.as_deref(), input.address.as_deref(), &transcript)?;
    let index = source.index(&series)?;

    match analyzer.check_intervals(&transcript, &index, check_all) {
        Ok(report) => {
            output::print_intervals(&report, json);
            Ok(Verdict::Pass)
        }
        Err(failure) => {
            info!(%failure, "interval check failed");
            output::print_failure("advertising intervals", &failure, json);
            Ok(Verdict::Fail)
        }
    }
}

/// Check first to last packet against `expected_s ± tolerance_s`.
pub fn duration(path: &Path, expected_s: f64, tolerance_s: f64, json: bool) -> Result<Verdict> {
    let transcript = load_transcript(path)?;
    let observed_s = transcript.duration_s();
    info!(observed_s, expected_s, tolerance_s, "advertising duration");
    output::print_duration(observed_s, expected_s, tolerance_s, json);
    Ok(Verdict::from_passed((observed_s - expected_s).abs() <= tolerance_s))
}
