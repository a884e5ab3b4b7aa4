//! Error types for advctl

use advscope_errors::{AdvScopeError, CatalogError, ScanError};
use thiserror::Error;

/// Input problems; every one of them exits with code 2.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] AdvScopeError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid address: {0}")]
    Address(#[from] ScanError),

    #[error("No device {0} in the transcript")]
    DeviceNotInTranscript(String),

    #[error("Transcript is empty")]
    EmptyTranscript,
}
