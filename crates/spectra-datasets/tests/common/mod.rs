#![allow(dead_code)]

use spectra_datasets::{Content, ParseError, ParserStrategy, SpectralDistribution};
use spectra_records::{Record, SyncError, SyncOutcome, Synchronize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counts syncs; fails them while `offline` is set.
#[derive(Default)]
pub struct StubSync {
    pub calls: AtomicUsize,
    pub offline: AtomicBool,
}

impl StubSync {
    pub fn offline() -> Self {
        let s = Self::default();
        s.offline.store(true, Ordering::SeqCst);
        s
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Synchronize for StubSync {
    fn sync(&self, record: &Record) -> Result<SyncOutcome, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Msg(format!("{}: offline", record.id)));
        }
        Ok(SyncOutcome::AlreadySynced)
    }
}

pub fn record(repository: &Path) -> Record {
    Record {
        id: "test".into(),
        title: "Test dataset".into(),
        version: None,
        repository: repository.to_path_buf(),
        files: Vec::new(),
    }
}

/// `n` distributions whose single sample value is `generation`.
pub fn generation_content(generation: usize, n: usize) -> Content {
    (0..n)
        .map(|i| {
            let name = format!("sd-{i}");
            let sd = SpectralDistribution::new(name.clone(), vec![500.0], vec![generation as f64])
                .unwrap();
            (name, sd)
        })
        .collect()
}

pub fn malformed(path: &Path) -> ParseError {
    ParseError::Malformed {
        path: path.to_path_buf(),
        line: 3,
        message: "expected 2 columns, found 1".into(),
    }
}

/// Box a closure as a parser, letting its signature be inferred.
pub fn parser<F>(f: F) -> Box<dyn ParserStrategy>
where
    F: Fn(&Path) -> Result<Content, ParseError> + Send + Sync + 'static,
{
    Box::new(f)
}
