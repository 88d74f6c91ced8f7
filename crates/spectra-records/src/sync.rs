//! Bring a record's repository to a complete, verified state.
//!
//! The repository only ever appears on disk fully formed: files are fetched,
//! verified and extracted into a private staging directory which is then
//! renamed into place. An advisory lock next to the repository serializes
//! concurrent syncs of the same record, including across processes.

use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};
use crate::extract::extract_into;
use crate::net::{Fetch, HttpFetcher};
use crate::paths::{lock_path, staging_dir, staging_dirs};
use crate::state::{inspect, save_marker};
use crate::types::{Record, RepositoryState, SyncOutcome};
use crate::verify::verify_file;
use fs2::FileExt;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Anything that can make a record's repository ready for parsing.
pub trait Synchronize: Send + Sync {
    fn sync(&self, record: &Record) -> Result<SyncOutcome>;
}

pub struct Synchronizer {
    fetcher: Arc<dyn Fetch>,
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(fetcher: Arc<dyn Fetch>, config: SyncConfig) -> Self {
        Self { fetcher, config }
    }

    /// Synchronizer over blocking HTTPS.
    pub fn http(config: SyncConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout())?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self, record: &Record) -> RepositoryState {
        inspect(record)
    }

    /// Delete the repository. The next `sync` fetches from scratch.
    pub fn remove(&self, record: &Record) -> Result<()> {
        record.check_names()?;
        let _lock = RepositoryLock::acquire(&record.repository)?;
        if record.repository.exists() {
            info!("removing {}", record.repository.display());
            fs::remove_dir_all(&record.repository)?;
        }
        Ok(())
    }

    fn sync_locked(&self, record: &Record) -> Result<SyncOutcome> {
        // leftovers of crashed syncs, from this process or any other
        for stale in staging_dirs(&record.repository) {
            warn!("record {}: removing stale {}", record.id, stale.display());
            fs::remove_dir_all(&stale)?;
        }

        match inspect(record) {
            RepositoryState::Verified => {
                debug!("record {} already synced", record.id);
                return Ok(SyncOutcome::AlreadySynced);
            }
            RepositoryState::Corrupt => {
                warn!(
                    "record {}: repository {} is corrupt, re-fetching",
                    record.id,
                    record.repository.display()
                );
                fs::remove_dir_all(&record.repository)?;
            }
            RepositoryState::Absent => {}
        }

        let max = self.config.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_into_place(record) {
                Ok(()) => {
                    info!("record {} synced ({attempt} attempt(s))", record.id);
                    return Ok(SyncOutcome::Fetched { attempts: attempt });
                }
                Err(e) if e.is_retryable() && attempt < max => {
                    let delay = self.config.backoff.delay_for(attempt);
                    warn!(
                        "record {}: attempt {attempt}/{max} failed: {e}; retrying in {delay:?}",
                        record.id
                    );
                    thread::sleep(delay);
                }
                Err(e) if e.is_retryable() => {
                    return Err(SyncError::Exhausted {
                        id: record.id.clone(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn fetch_into_place(&self, record: &Record) -> Result<()> {
        let staging = staging_dir(&record.repository);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }

        let result = self
            .populate(record, &staging)
            .and_then(|()| commit(record, &staging));
        if result.is_err() && staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!("could not clean {}: {e}", staging.display());
            }
        }
        result
    }

    fn populate(&self, record: &Record, staging: &Path) -> Result<()> {
        let downloads = staging.join("downloads");
        let dataset = staging.join("dataset");
        fs::create_dir_all(&downloads)?;
        fs::create_dir_all(&dataset)?;

        for file in &record.files {
            let path = downloads.join(&file.name);
            self.fetcher.fetch(&file.url, &path)?;
            verify_file(&file.name, &path, &file.checksum, file.size)?;
            extract_into(&path, &dataset)?;
        }
        save_marker(staging, record)
    }
}

impl Synchronize for Synchronizer {
    fn sync(&self, record: &Record) -> Result<SyncOutcome> {
        record.check_names()?;
        if let Some(parent) = record.repository.parent() {
            fs::create_dir_all(parent)?;
        }
        let _lock = RepositoryLock::acquire(&record.repository)?;
        self.sync_locked(record)
    }
}

/// Move a fully populated staging directory to the repository path.
fn commit(record: &Record, staging: &Path) -> Result<()> {
    match fs::rename(staging, &record.repository) {
        Ok(()) => Ok(()),
        // Someone without the lock got there first; keep theirs if it is good.
        Err(_) if inspect(record) == RepositoryState::Verified => {
            warn!(
                "record {}: repository appeared during sync, discarding staged copy",
                record.id
            );
            fs::remove_dir_all(staging)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Exclusive advisory lock on `<parent>/.<id>.lock`, released on drop.
struct RepositoryLock {
    file: fs::File,
}

impl RepositoryLock {
    fn acquire(repository: &Path) -> Result<Self> {
        let path = lock_path(repository);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for RepositoryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
