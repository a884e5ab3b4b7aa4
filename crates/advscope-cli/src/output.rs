//! Output formatting for advctl

use advscope_analysis::{IntervalReport, SequenceReport};
use advscope_catalog::{CatalogSeries, PairingCapabilities, SeriesDefinition, TimelineSegment};
use anyhow::Error;
use colored::Colorize;
use serde_json::{Value, json};

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

fn badge(passed: bool) -> colored::ColoredString {
    if passed { "PASS".green().bold() } else { "FAIL".red().bold() }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "causes": chain,
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// One line per expected series: verdict, overlap and violations.
#[must_use]
pub fn render_verdicts(report: &SequenceReport) -> String {
    let mut lines = Vec::new();
    for verdict in &report.timeline.verdicts {
        let head = match &verdict.overlapped_by {
            Some(by) => format!("{} (overlapped by {by})", verdict.series),
            None => verdict.series.clone(),
        };
        lines.push(format!("{head}: {}", if verdict.passed() { "pass" } else { "fail" }));
        lines.extend(verdict.violations.iter().map(|v| format!("  {v}")));
    }
    lines.join("\n")
}

/// Print a sequence verdict
pub fn print_sequence(report: &SequenceReport, json: bool) {
    let diagnostics: Vec<String> = report.diagnostics().iter().map(ToString::to_string).collect();
    if json {
        let verdicts: Vec<Value> = report
            .timeline
            .verdicts
            .iter()
            .map(|v| {
                json!({
                    "series": v.series,
                    "overlapped_by": v.overlapped_by,
                    "passed": v.passed(),
                    "violations": v.violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&json!({
            "success": true,
            "passed": report.passed(),
            "observed_order": report.analysis.observed_order(),
            "verdicts": verdicts,
            "statistics": report.analysis.statistics,
            "diagnostics": diagnostics,
        }));
        return;
    }

    println!("{} advertising sequence", badge(report.passed()));
    println!("  Observed order: {}", report.analysis.observed_order().join(" "));
    for line in render_verdicts(report).lines() {
        println!("  {line}");
    }
    if !diagnostics.is_empty() {
        println!("  {}:", "Diagnostics".yellow());
        for d in &diagnostics {
            println!("    {d}");
        }
    }
}

/// Print a passing interval report
pub fn print_intervals(report: &IntervalReport, json: bool) {
    if json {
        print_json(&json!({ "success": true, "passed": true, "report": report }));
        return;
    }
    println!("{} advertising intervals", badge(true));
    for summary in &report.summaries {
        let mean = summary
            .mean_per_packet_ms()
            .map_or_else(|| "-".to_string(), |m| format!("{m:.3} ms"));
        println!(
            "  {}: {} batch(es), {} good, {} wrong, mean per packet {mean}",
            summary.interval,
            summary.batches,
            summary.good.len(),
            summary.wrong.len()
        );
    }
}

/// Print a failed assertion that is not a schedule verdict
pub fn print_failure(what: &str, failure: &dyn std::fmt::Display, json: bool) {
    if json {
        print_json(&json!({ "success": true, "passed": false, "failure": failure.to_string() }));
    } else {
        println!("{} {what}", badge(false));
        println!("  {failure}");
    }
}

/// Print a measured duration
pub fn print_duration(observed_s: f64, expected_s: f64, tolerance_s: f64, json: bool) {
    let passed = (observed_s - expected_s).abs() <= tolerance_s;
    if json {
        print_json(&json!({
            "success": true,
            "passed": passed,
            "observed_s": observed_s,
            "expected_s": expected_s,
            "tolerance_s": tolerance_s,
        }));
    } else {
        println!("{} advertising duration", badge(passed));
        println!("  Observed {observed_s:.3} s, expected {expected_s} s ± {tolerance_s} s");
    }
}

/// Print the expected priority timeline
pub fn print_timeline(series: &[SeriesDefinition], segments: &[TimelineSegment], json: bool) {
    let name = |i: usize| series.get(i).map_or("?", |s| s.name.as_str());
    if json {
        let rows: Vec<Value> = segments
            .iter()
            .map(|s| json!({ "series": name(s.series), "start_s": s.start_s, "stop_s": s.stop_s }))
            .collect();
        print_json(&json!({ "success": true, "timeline": rows }));
        return;
    }
    println!("{}", "Expected timeline:".bold());
    for segment in segments {
        println!(
            "  {:>9.3} s .. {:>9.3} s  {}",
            segment.start_s,
            segment.stop_s,
            name(segment.series).cyan()
        );
    }
}

/// Print the application-pairing selection
pub fn print_pairing_series(caps: PairingCapabilities, prepairing: bool, series: &[CatalogSeries], json: bool) {
    let names: Vec<&str> = series.iter().map(|s| s.name()).collect();
    if json {
        print_json(&json!({
            "success": true,
            "capabilities": caps,
            "prepairing": prepairing,
            "series": names,
        }));
        return;
    }
    let suffix = if prepairing { ", prepairing" } else { "" };
    println!("{}{suffix}: {}", caps.to_string().bold(), names.join(","));
}
