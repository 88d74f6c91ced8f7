use super::RecordResolver;
use crate::errors::{ResolveError, SyncError};
use crate::paths::repository_dir;
use crate::types::{Record, RecordFile};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One record as listed in a local catalog file (no repository path yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    pub files: Vec<RecordFile>,
}

/// Offline resolver over a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    records: BTreeMap<String, Record>,
}

impl CatalogResolver {
    /// Place each entry's repository under `home/<id>`.
    pub fn new(home: &Path, entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let records = entries
            .into_iter()
            .map(|e| {
                let record = Record {
                    repository: repository_dir(home, &e.id),
                    id: e.id,
                    title: e.title,
                    version: e.version,
                    files: e.files,
                };
                (record.id.clone(), record)
            })
            .collect();
        Self { records }
    }

    /// Read a JSON array of [`CatalogEntry`].
    pub fn from_path(home: &Path, catalog: &Path) -> Result<Self, SyncError> {
        let txt = fs::read_to_string(catalog)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&txt)
            .with_context(|| format!("invalid catalog JSON in {}", catalog.display()))?;
        let resolver = Self::new(home, entries);
        for record in resolver.records.values() {
            record.check_names()?;
        }
        Ok(resolver)
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn repository_of(&self, id: &str) -> Option<PathBuf> {
        self.records.get(id).map(|r| r.repository.clone())
    }
}

impl RecordResolver for CatalogResolver {
    fn resolve(&self, id: &str) -> Result<Record, ResolveError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownDataset(id.to_string()))
    }
}
