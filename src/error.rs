use crate::organisms::Species;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to callers that configure or populate the ecosystem.
#[derive(Debug, Error)]
pub enum EcosystemError {
    /// A creation request named a species with no profile in the species table.
    #[error("no species profile configured for {0:?}")]
    UnknownSpecies(Species),
    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
