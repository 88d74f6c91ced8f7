use crate::environment::{environment, Environment};
use crate::errors::Result;
use crate::loader::DatasetLoader;
use crate::parser::ParserStrategy;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Holds at most one loader; constructed once no matter how many callers race.
///
/// Lives in a `static`, so every operation (including [`reset`](Self::reset))
/// goes through `&self`.
pub struct DatasetSlot {
    cell: Mutex<Option<Arc<DatasetLoader>>>,
}

impl DatasetSlot {
    pub const fn new() -> Self {
        Self {
            cell: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<DatasetLoader>>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Option<Arc<DatasetLoader>> {
        self.lock().clone()
    }

    /// Return the cached loader, constructing it with `init` if the slot is empty.
    ///
    /// Only the caller that constructs the loader loads it (when `load` is
    /// set). If that load fails the error is returned, but the unloaded loader
    /// stays in the slot for later `get`/`build_with` calls.
    pub fn build_with<F>(&self, load: bool, init: F) -> Result<Arc<DatasetLoader>>
    where
        F: FnOnce() -> Result<DatasetLoader>,
    {
        let loader = {
            let mut cell = self.lock();
            match cell.as_ref() {
                Some(loader) => return Ok(loader.clone()),
                None => {
                    let loader = Arc::new(init()?);
                    *cell = Some(loader.clone());
                    loader
                }
            }
        };

        // outside the slot lock; the loader serializes its own loads
        debug!("constructed loader for dataset {}", loader.id());
        if load {
            loader.load()?;
        }
        Ok(loader)
    }

    /// Empty the slot, handing back whatever it held.
    ///
    /// Holders of the old loader keep it; the next build constructs a new one.
    pub fn reset(&self) -> Option<Arc<DatasetLoader>> {
        self.lock().take()
    }
}

impl Default for DatasetSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// A dataset type with its own parser and process-wide slot.
pub trait Dataset: ParserStrategy + Default + 'static {
    /// Record id, e.g. the Zenodo record number.
    const ID: &'static str;
    const NAME: &'static str;

    fn slot() -> &'static DatasetSlot;
}

/// Construct a loader for `D` against `env`, without caching it anywhere.
pub fn loader_for<D: Dataset>(env: &Environment) -> Result<DatasetLoader> {
    let record = env.resolver.resolve(D::ID)?;
    Ok(DatasetLoader::new(
        record,
        Box::new(D::default()),
        env.synchronizer.clone(),
    ))
}

/// Singleton factory for dataset type `D`.
///
/// `load` only matters on the call that constructs the loader.
pub fn build<D: Dataset>(load: bool) -> Result<Arc<DatasetLoader>> {
    D::slot().build_with(load, || loader_for::<D>(environment()?))
}
