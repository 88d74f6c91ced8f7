use crate::errors::SyncError;
use crate::paths::is_plain_name;
use crate::verify::Checksum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single remote file belonging to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFile {
    pub name: String, // e.g. "Labsphere_SRS-99-020.zip"
    pub url: String,  // direct HTTPS URL
    pub checksum: Checksum,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Immutable metadata for one published dataset.
///
/// Produced once by a [`RecordResolver`](crate::RecordResolver); the
/// `repository` directory is owned exclusively by whichever loader holds
/// this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    pub repository: PathBuf,
    pub files: Vec<RecordFile>,
}

impl Record {
    /// `<repository>/downloads`
    pub fn downloads_dir(&self) -> PathBuf {
        self.repository.join("downloads")
    }

    /// `<repository>/dataset`
    pub fn dataset_dir(&self) -> PathBuf {
        self.repository.join("dataset")
    }

    /// Reject ids and file names that would resolve outside the repository.
    pub fn check_names(&self) -> Result<(), SyncError> {
        let unsafe_name = |name: &str| SyncError::UnsafeName {
            id: self.id.clone(),
            name: name.to_string(),
        };
        if !is_plain_name(&self.id) {
            return Err(unsafe_name(&self.id));
        }
        match self.files.iter().find(|f| !is_plain_name(&f.name)) {
            Some(f) => Err(unsafe_name(&f.name)),
            None => Ok(()),
        }
    }
}

/// Where a repository stands relative to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryState {
    Absent,
    Verified,
    Corrupt,
}

/// What a successful `sync` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    AlreadySynced,
    Fetched { attempts: u32 },
}
