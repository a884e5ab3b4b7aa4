//! Catalog queries

use advscope_catalog::{CatalogSeries, PairingCapabilities, application_pairing_series, expected_timeline};
use anyhow::Result;

use crate::commands::Verdict;
use crate::error::CliError;
use crate::input::series_definitions;
use crate::output;

pub fn timeline(series: &str, horizon_s: Option<f64>, json: bool) -> Result<Verdict> {
    let definitions = series_definitions(series)?;
    let segments = expected_timeline(&definitions, horizon_s);
    output::print_timeline(&definitions, &segments, json);
    Ok(Verdict::Pass)
}

pub fn pairing_series(caps: PairingCapabilities, prepairing: bool, json: bool) -> Result<Verdict> {
    let series: Vec<CatalogSeries> = application_pairing_series(caps, prepairing).map_err(CliError::from)?;
    output::print_pairing_series(caps, prepairing, &series, json);
    Ok(Verdict::Pass)
}
