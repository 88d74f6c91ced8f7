//! spectra-datasets
//!
//! Turns published spectral datasets into named [`SpectralDistribution`]s.
//! - [`DatasetLoader`]: sync the record's repository, run its parser, keep the content.
//! - [`ParserStrategy`]: one per dataset, pure function of the repository path.
//! - [`DatasetSlot`] / [`build`]: one lazily built loader per dataset type, process-wide.
//!
//! ```no_run
//! let content = spectra_datasets::load("3245875")?;
//! let sd = &content["Labsphere SRS-99-020"];
//! println!("{} samples", sd.len());
//! # Ok::<(), spectra_datasets::DatasetError>(())
//! ```

pub mod datasets;
pub mod environment;
pub mod errors;
pub mod loader;
pub mod parser;
pub mod parsing;
pub mod registry;
pub mod sd;
pub mod singleton;

pub use datasets::{build_labsphere2019, Labsphere2019};
pub use environment::{environment, install_environment, Environment};
pub use errors::{DatasetError, ParseError};
pub use loader::DatasetLoader;
pub use parser::{Content, ParserStrategy};
pub use registry::{build_dataset, datasets, load, DatasetInfo};
pub use sd::SpectralDistribution;
pub use singleton::{build, loader_for, Dataset, DatasetSlot};
