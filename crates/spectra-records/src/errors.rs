use std::io::ErrorKind;
use thiserror::Error;

/// Failure while bringing a record's repository to a verified state.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Msg(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Net(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("checksum mismatch for {name} (got {got}, want {want})")]
    Checksum {
        name: String,
        got: String,
        want: String,
    },

    #[error("record {id}: {name:?} is not a plain file name")]
    UnsafeName { id: String, name: String },

    #[error("size mismatch for {name} (got {got} bytes, want {want})")]
    Size { name: String, got: u64, want: u64 },

    #[error("sync of record {id} failed after {attempts} attempt(s): {last}")]
    Exhausted {
        id: String,
        attempts: u32,
        #[source]
        last: Box<SyncError>,
    },
}

impl SyncError {
    /// Transport and integrity failures may clear up on a fresh download.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Net(_)
            | SyncError::Status { .. }
            | SyncError::Checksum { .. }
            | SyncError::Size { .. } => true,
            // a body read dropping mid-stream
            SyncError::Io(e) => matches!(
                e.kind(),
                ErrorKind::TimedOut
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::UnexpectedEof
                    | ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

impl From<anyhow::Error> for SyncError {
    fn from(e: anyhow::Error) -> Self {
        SyncError::Msg(format!("{e:#}"))
    }
}

/// Failure while mapping a dataset id to its record.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("record lookup failed for {id}: {source}")]
    Lookup {
        id: String,
        #[source]
        source: SyncError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
