//! Dataset id -> [`Record`] resolution.

mod catalog;
mod zenodo;

pub use catalog::{CatalogEntry, CatalogResolver};
pub use zenodo::ZenodoResolver;

use crate::errors::ResolveError;
use crate::types::Record;

/// Maps stable dataset ids to immutable records.
pub trait RecordResolver: Send + Sync {
    fn resolve(&self, id: &str) -> Result<Record, ResolveError>;
}
