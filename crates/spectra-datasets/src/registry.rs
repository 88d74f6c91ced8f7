//! Dataset id -> singleton factory dispatch.

use crate::datasets::Labsphere2019;
use crate::errors::{DatasetError, Result};
use crate::loader::DatasetLoader;
use crate::parser::Content;
use crate::singleton::{build, Dataset};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    pub id: &'static str,
    pub name: &'static str,
}

type BuildFn = fn(bool) -> Result<Arc<DatasetLoader>>;

struct Entry {
    info: DatasetInfo,
    build: BuildFn,
}

fn entry<D: Dataset>() -> Entry {
    Entry {
        info: DatasetInfo {
            id: D::ID,
            name: D::NAME,
        },
        build: build::<D>,
    }
}

static REGISTRY: Lazy<BTreeMap<&'static str, Entry>> = Lazy::new(|| {
    [entry::<Labsphere2019>()]
        .into_iter()
        .map(|e| (e.info.id, e))
        .collect()
});

/// Every dataset with a registered loader, ordered by id.
pub fn datasets() -> Vec<DatasetInfo> {
    REGISTRY.values().map(|e| e.info).collect()
}

/// Singleton loader for a dataset id.
pub fn build_dataset(id: &str, load: bool) -> Result<Arc<DatasetLoader>> {
    let entry = REGISTRY
        .get(id)
        .ok_or_else(|| DatasetError::UnregisteredDataset(id.to_string()))?;
    (entry.build)(load)
}

/// Build (if needed) and return the loaded content of a dataset.
///
/// Already loaded singletons are returned as they are, without re-syncing.
pub fn load(id: &str) -> Result<Arc<Content>> {
    let loader = build_dataset(id, true)?;
    match loader.content() {
        Some(content) => Ok(content),
        None => loader.load(),
    }
}
