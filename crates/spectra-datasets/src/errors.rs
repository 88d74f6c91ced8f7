use spectra_records::{ConfigError, ResolveError, SyncError};
use std::path::PathBuf;
use thiserror::Error;

/// A dataset's raw files could not be turned into distributions.
///
/// Never retried: the same bytes will fail the same way.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing dataset file {}", path.display())]
    Missing { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{name}: {domain} wavelengths but {range} values")]
    DimensionMismatch {
        name: String,
        domain: usize,
        range: usize,
    },

    #[error("{name}: wavelength {current} at index {index} does not increase on {previous}")]
    NonMonotonic {
        name: String,
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("{name}: no samples")]
    Empty { name: String },
}

/// Everything `build`/`load` can surface, unchanged in kind.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no loader registered for dataset {0}")]
    UnregisteredDataset(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
