//! Loading transcripts, configuration and device profiles from disk.

use std::fs;
use std::path::Path;

use advscope_analysis::{AnalysisConfig, BleAddress, DeviceCapture, PayloadIndex, ScanTranscript};
use advscope_catalog::{CatalogSeries, DeviceProfile, SeriesDefinition, TemplatePayloadBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::CliError;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json { path: display, source })
}

/// Read a recorded scan transcript.
pub fn load_transcript(path: &Path) -> Result<ScanTranscript, CliError> {
    let transcript: ScanTranscript = read_json(path)?;
    info!(
        path = %path.display(),
        devices = transcript.devices.len(),
        packets = transcript.records().len(),
        "transcript loaded"
    );
    Ok(transcript)
}

/// Read and validate an analysis configuration, or take the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    let config = match path {
        Some(path) => read_json(path)?,
        None => AnalysisConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Parse `--series A,B,C` into catalog definitions.
pub fn series_definitions(list: &str) -> Result<Vec<SeriesDefinition>, CliError> {
    let series = CatalogSeries::parse_list(list)?;
    Ok(CatalogSeries::definitions(&series))
}

/// How recorded payloads are attributed to the expected series.
pub enum PayloadSource<'a> {
    /// Build every payload from a device profile
    Profile(TemplatePayloadBuilder),
    /// Pair payloads with series in the order the device first sent them
    FirstSeen(&'a DeviceCapture),
}

impl<'a> PayloadSource<'a> {
    /// Use `profile` when given, otherwise the first-seen payloads of `address`
    /// (or of the first device of the transcript).
    pub fn resolve(
        profile: Option<&Path>,
        address: Option<&str>,
        transcript: &'a ScanTranscript,
    ) -> Result<Self, CliError> {
        if let Some(path) = profile {
            let profile: DeviceProfile = read_json(path)?;
            return Ok(Self::Profile(TemplatePayloadBuilder::new(profile)));
        }
        let device = match address {
            Some(text) => {
                let address: BleAddress = text.parse()?;
                transcript
                    .device(&address)
                    .ok_or_else(|| CliError::DeviceNotInTranscript(text.to_string()))?
            }
            None => transcript.devices.first().ok_or(CliError::EmptyTranscript)?,
        };
        debug!(address = %device.address, "payloads attributed by first appearance");
        Ok(Self::FirstSeen(device))
    }

    /// Index the expected series' payloads.
    pub fn index<'s>(&self, series: &'s [SeriesDefinition]) -> Result<PayloadIndex<'s>, CliError> {
        match self {
            Self::Profile(builder) => Ok(PayloadIndex::new(series, builder)?),
            Self::FirstSeen(device) => Ok(PayloadIndex::by_first_seen(series, device)),
        }
    }
}
