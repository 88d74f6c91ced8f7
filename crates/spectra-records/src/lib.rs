//! spectra-records
//!
//! Blocking I/O helpers for Spectra's dataset records.
//! - Resolves dataset ids to immutable records (local catalog or Zenodo).
//! - Downloads, verifies and extracts record files into a repository directory.
//! - Keeps each repository either absent or complete; never half-written.
//!
//! Everything here blocks; call it from a worker thread when that matters.

pub mod config;
pub mod errors;
pub mod extract;
pub mod net;
pub mod paths;
pub mod resolver;
pub mod state;
pub mod sync;
pub mod types;
pub mod verify;

pub use config::{Backoff, Settings, SyncConfig, DEFAULT_ZENODO_API};
pub use errors::{ConfigError, ResolveError, SyncError};
pub use net::{Fetch, HttpFetcher};
pub use paths::*;
pub use resolver::{CatalogEntry, CatalogResolver, RecordResolver, ZenodoResolver};
pub use sync::{Synchronize, Synchronizer};
pub use types::*;
pub use verify::{Algorithm, Checksum};
