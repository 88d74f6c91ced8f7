//! On-disk marker recording what a repository was synced from.

use crate::errors::{Result, SyncError};
use crate::types::{Record, RecordFile, RepositoryState};
use crate::verify::{hash_file, verify_file, Algorithm, Checksum};
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json as json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MARKER_FILE: &str = ".sync.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMarker {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub files: Vec<MarkerFile>,
    /// Every regular file extracted under `dataset/`, sorted by path.
    #[serde(default)]
    pub entries: Vec<MarkerEntry>,
    pub synced_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerFile {
    pub name: String,
    pub checksum: Checksum,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub path: String, // relative to dataset/, '/'-separated
    pub size: u64,
    pub checksum: Checksum,
}

impl SyncMarker {
    fn describes(&self, record: &Record) -> bool {
        self.id == record.id
            && self.version == record.version
            && self.files.len() == record.files.len()
            && self.files.iter().zip(&record.files).all(|(m, f)| {
                m.name == f.name && m.checksum == f.checksum && f.size.map_or(true, |s| s == m.size)
            })
    }
}

pub fn marker_path(repository: &Path) -> PathBuf {
    repository.join(MARKER_FILE)
}

pub fn load_marker(repository: &Path) -> Option<SyncMarker> {
    let buf = fs::read(marker_path(repository)).ok()?;
    json::from_slice(&buf).ok()
}

/// Write the marker for `record` into `repository` (normally a staging dir).
pub fn save_marker(repository: &Path, record: &Record) -> Result<()> {
    let mut files = Vec::with_capacity(record.files.len());
    for f in &record.files {
        files.push(MarkerFile {
            name: f.name.clone(),
            checksum: f.checksum.clone(),
            size: fs::metadata(repository.join("downloads").join(&f.name))?.len(),
        });
    }
    let marker = SyncMarker {
        id: record.id.clone(),
        version: record.version.clone(),
        files,
        entries: dataset_entries(&repository.join("dataset"))?,
        synced_at: Utc::now().to_rfc3339(),
    };

    let tmp = repository.join(".sync.json.tmp");
    fs::write(&tmp, json::to_vec_pretty(&marker)?)?;
    fs::rename(&tmp, marker_path(repository))?;
    Ok(())
}

/// `dataset/`-relative, '/'-separated form of an extracted file's path.
fn relative(dataset: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(dataset).unwrap_or(path);
    let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    parts.join("/")
}

/// Regular files under `dataset/` with their sizes, sorted by path.
fn walk_dataset(dataset: &Path) -> io::Result<Vec<(String, u64)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dataset) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let size = entry.metadata()?.len();
            files.push((relative(dataset, entry.path()), size));
        }
    }
    files.sort();
    Ok(files)
}

fn dataset_entries(dataset: &Path) -> Result<Vec<MarkerEntry>> {
    let mut entries = Vec::new();
    for (path, size) in walk_dataset(dataset)? {
        let hex = hash_file(&dataset.join(&path), Algorithm::Sha256)?;
        entries.push(MarkerEntry {
            path,
            size,
            checksum: Checksum {
                algorithm: Algorithm::Sha256,
                hex,
            },
        });
    }
    Ok(entries)
}

/// Compare the extracted tree on disk against what the marker recorded.
fn check_dataset(dataset: &Path, recorded: &[MarkerEntry]) -> Result<()> {
    let on_disk = walk_dataset(dataset)?;
    let want: Vec<_> = recorded.iter().map(|e| (e.path.clone(), e.size)).collect();
    if on_disk != want {
        return Err(SyncError::Msg(format!(
            "extracted files differ from marker ({} on disk, {} recorded)",
            on_disk.len(),
            want.len()
        )));
    }
    for entry in recorded {
        let name = format!("dataset/{}", entry.path);
        verify_file(&name, &dataset.join(&entry.path), &entry.checksum, None)?;
    }
    Ok(())
}

/// Classify `record.repository` without touching the network.
pub fn inspect(record: &Record) -> RepositoryState {
    if !record.repository.exists() {
        return RepositoryState::Absent;
    }
    if let Err(e) = record.check_names() {
        warn!("{e}");
        return RepositoryState::Corrupt;
    }

    let Some(marker) = load_marker(&record.repository) else {
        warn!("{}: missing or unreadable sync marker", record.repository.display());
        return RepositoryState::Corrupt;
    };
    if !marker.describes(record) {
        warn!("{}: marker does not match record {}", record.repository.display(), record.id);
        return RepositoryState::Corrupt;
    }
    if !record.dataset_dir().is_dir() {
        return RepositoryState::Corrupt;
    }

    for (file, seen) in record.files.iter().zip(&marker.files) {
        let path = record.downloads_dir().join(&file.name);
        if let Err(e) = verify_download(file, &path, seen.size) {
            warn!("{}: {e}", record.repository.display());
            return RepositoryState::Corrupt;
        }
    }
    if let Err(e) = check_dataset(&record.dataset_dir(), &marker.entries) {
        warn!("{}: {e}", record.repository.display());
        return RepositoryState::Corrupt;
    }

    debug!("{}: verified", record.repository.display());
    RepositoryState::Verified
}

fn verify_download(file: &RecordFile, path: &Path, size: u64) -> Result<()> {
    verify_file(&file.name, path, &file.checksum, Some(file.size.unwrap_or(size)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::Algorithm;

    fn record_at(repo: &Path, bytes: &[u8]) -> Record {
        Record {
            id: "42".into(),
            title: "Answer".into(),
            version: Some("1".into()),
            repository: repo.to_path_buf(),
            files: vec![RecordFile {
                name: "answer.txt".into(),
                url: "https://example.org/answer.txt".into(),
                checksum: Checksum::of_bytes(Algorithm::Sha256, bytes),
                size: Some(bytes.len() as u64),
            }],
        }
    }

    fn populate(record: &Record, bytes: &[u8]) {
        fs::create_dir_all(record.downloads_dir()).unwrap();
        fs::create_dir_all(record.dataset_dir().join("nested")).unwrap();
        fs::write(record.downloads_dir().join("answer.txt"), bytes).unwrap();
        fs::write(record.dataset_dir().join("answer.txt"), bytes).unwrap();
        fs::write(record.dataset_dir().join("nested/notes.txt"), b"n").unwrap();
    }

    #[test]
    fn absent_then_verified() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_at(&dir.path().join("42"), b"forty-two");
        assert_eq!(inspect(&record), RepositoryState::Absent);

        populate(&record, b"forty-two");
        save_marker(&record.repository, &record).unwrap();
        assert_eq!(inspect(&record), RepositoryState::Verified);
    }

    #[test]
    fn tampered_download_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_at(&dir.path().join("42"), b"forty-two");
        populate(&record, b"forty-two");
        save_marker(&record.repository, &record).unwrap();

        fs::write(record.downloads_dir().join("answer.txt"), b"forty-tw0").unwrap();
        assert_eq!(inspect(&record), RepositoryState::Corrupt);
    }

    #[test]
    fn marker_lists_extracted_tree() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_at(&dir.path().join("42"), b"forty-two");
        populate(&record, b"forty-two");
        save_marker(&record.repository, &record).unwrap();

        let marker = load_marker(&record.repository).unwrap();
        let paths: Vec<_> = marker.entries.iter().map(|e| (e.path.as_str(), e.size)).collect();
        assert_eq!(paths, vec![("answer.txt", 9), ("nested/notes.txt", 1)]);
    }

    #[test]
    fn missing_changed_or_extra_extracted_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_at(&dir.path().join("42"), b"forty-two");
        let dataset = record.dataset_dir();

        // same size, different bytes
        populate(&record, b"forty-two");
        save_marker(&record.repository, &record).unwrap();
        fs::write(dataset.join("answer.txt"), b"forty-tw0").unwrap();
        assert_eq!(inspect(&record), RepositoryState::Corrupt);

        populate(&record, b"forty-two");
        fs::remove_file(dataset.join("nested/notes.txt")).unwrap();
        assert_eq!(inspect(&record), RepositoryState::Corrupt);

        populate(&record, b"forty-two");
        assert_eq!(inspect(&record), RepositoryState::Verified);
        fs::write(dataset.join("stray.txt"), b"?").unwrap();
        assert_eq!(inspect(&record), RepositoryState::Corrupt);
    }

    #[test]
    fn missing_marker_or_changed_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_at(&dir.path().join("42"), b"forty-two");
        populate(&record, b"forty-two");
        assert_eq!(inspect(&record), RepositoryState::Corrupt);

        save_marker(&record.repository, &record).unwrap();
        let mut newer = record.clone();
        newer.version = Some("2".into());
        assert_eq!(inspect(&newer), RepositoryState::Corrupt);
    }
}
