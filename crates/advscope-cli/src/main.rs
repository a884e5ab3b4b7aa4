//! advctl - BLE advertising analysis CLI
//!
//! Replays recorded scan transcripts through the advscope analysis and
//! answers catalog questions (expected timeline, application-pairing series)
//! without a scanner or a device.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod input;
mod output;

use std::process::ExitCode;

use advscope_catalog::PairingCapabilities;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, Verdict};

#[derive(Parser, Debug)]
#[command(name = "advctl")]
#[command(about = "BLE advertising analysis - replay recorded scans against the advertising catalog")]
#[command(version)]
#[command(long_about = "
advctl checks recorded BLE scan transcripts against the expected advertising
series: schedule, intervals and duration. It also prints the expected
priority timeline of a series list and the series a product advertises in
application pairing.

Exit status is 0 when the capture passed, 1 when it failed the check and 2
when the input could not be used.
Use --json for machine-readable output.
")]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "advctl={level},advscope_analysis={level},advscope_catalog={level}"
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn execute_command(cli: &Cli) -> Result<Verdict> {
    match &cli.command {
        Commands::Sequence { input, horizon } => commands::replay::sequence(input, *horizon, cli.json),
        Commands::Interval { input, check_all } => commands::replay::interval(input, *check_all, cli.json),
        Commands::Duration {
            transcript,
            expected,
            tolerance,
        } => commands::replay::duration(transcript, *expected, *tolerance, cli.json),
        Commands::Timeline { series, horizon } => commands::catalog::timeline(series, *horizon, cli.json),
        Commands::PairingSeries {
            swift_pair,
            ble_pro,
            fast_pair,
            prepairing,
        } => {
            let caps = PairingCapabilities {
                swift_pair: *swift_pair,
                ble_pro: *ble_pro,
                fast_pair: *fast_pair,
            };
            commands::catalog::pairing_series(caps, *prepairing, cli.json)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute_command(&cli) {
        Ok(Verdict::Pass) => ExitCode::SUCCESS,
        Ok(Verdict::Fail) => ExitCode::from(1),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_sequence_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["advctl", "sequence", "scan.json", "--series", "A,B,C"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        let Commands::Sequence { input, horizon } = cli.command else {
            return Err("expected sequence".into());
        };
        assert_eq!(input.series, "A,B,C");
        assert!(input.config.is_none());
        assert!(input.profile.is_none());
        assert!(horizon.is_none());
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["advctl", "timeline", "-s", "A", "--json", "-vv"])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        Ok(())
    }

    #[test]
    fn parse_interval_check_all() -> TestResult {
        let cli = Cli::try_parse_from(["advctl", "interval", "scan.json", "-s", "E", "--check-all"])?;
        assert!(matches!(cli.command, Commands::Interval { check_all: true, .. }));
        Ok(())
    }

    #[test]
    fn parse_duration_default_tolerance() -> TestResult {
        let cli = Cli::try_parse_from(["advctl", "duration", "scan.json", "--expected", "30"])?;
        let Commands::Duration { expected, tolerance, .. } = cli.command else {
            return Err("expected duration".into());
        };
        assert!((expected - 30.0).abs() < f64::EPSILON);
        assert!((tolerance - 1.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn parse_pairing_flags() -> TestResult {
        let cli = Cli::try_parse_from(["advctl", "pairing-series", "--swift-pair", "--prepairing"])?;
        assert!(matches!(
            cli.command,
            Commands::PairingSeries {
                swift_pair: true,
                ble_pro: false,
                fast_pair: false,
                prepairing: true,
            }
        ));
        Ok(())
    }

    #[test]
    fn parse_requires_series() -> TestResult {
        let Err(e) = Cli::try_parse_from(["advctl", "sequence", "scan.json"]) else {
            return Err("series should be required".into());
        };
        assert_eq!(e.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        Ok(())
    }
}
