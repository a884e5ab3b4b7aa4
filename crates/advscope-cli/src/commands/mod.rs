//! Command implementations for advctl

pub mod catalog;
pub mod replay;

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Whether the checked capture met its expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Where the transcript comes from and how its payloads are attributed.
#[derive(Args, Debug, Clone)]
pub struct TranscriptArgs {
    /// Recorded scan transcript (JSON)
    pub transcript: PathBuf,

    /// Expected series, comma separated and lowest priority first (e.g. A,B,C)
    #[arg(short, long)]
    pub series: String,

    /// Analysis configuration (JSON); defaults apply to missing fields
    #[arg(short, long, env = "ADVCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device profile (JSON) to build the expected payloads from
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Device whose payloads name the series when no profile is given
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a recorded scan against the expected advertising schedule
    Sequence {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Capture length in seconds, for scans cut short of the last stop time
        #[arg(long)]
        horizon: Option<f64>,
    },

    /// Check the advertising intervals of a recorded scan
    Interval {
        #[command(flatten)]
        input: TranscriptArgs,

        /// Hold every interval to the wrong-interval budget instead of the mean
        #[arg(long)]
        check_all: bool,
    },

    /// Check how long a recorded scan saw the device advertise
    Duration {
        /// Recorded scan transcript (JSON)
        transcript: PathBuf,

        /// Expected duration in seconds
        #[arg(short, long)]
        expected: f64,

        /// Accepted error in seconds
        #[arg(short, long, default_value = "1.0")]
        tolerance: f64,
    },

    /// Print the expected priority timeline of a series list
    Timeline {
        /// Expected series, comma separated and lowest priority first
        #[arg(short, long)]
        series: String,

        /// Stop the timeline here, in seconds
        #[arg(long)]
        horizon: Option<f64>,
    },

    /// List the series advertised in application pairing
    PairingSeries {
        /// Windows Swift Pair
        #[arg(long)]
        swift_pair: bool,

        /// BLE Pro receiver pairing
        #[arg(long)]
        ble_pro: bool,

        /// Google Fast Pair
        #[arg(long)]
        fast_pair: bool,

        /// Device prepairs on its current address
        #[arg(long)]
        prepairing: bool,
    },
}
