//! Labsphere SRS-99-020 reflectance standard (Labsphere, 2019).
//!
//! doi:10.5281/zenodo.3245875

use crate::errors::{ParseError, Result};
use crate::loader::DatasetLoader;
use crate::parser::{single, Content, ParserStrategy};
use crate::parsing::{read_pairs, read_text};
use crate::sd::SpectralDistribution;
use crate::singleton::{build, Dataset, DatasetSlot};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy)]
pub struct Labsphere2019;

impl Labsphere2019 {
    /// `<repository>/dataset/SRS-99-020.txt`
    pub const FILE: &'static str = "SRS-99-020.txt";
}

impl Dataset for Labsphere2019 {
    const ID: &'static str = "3245875";
    const NAME: &'static str = "Labsphere SRS-99-020";

    fn slot() -> &'static DatasetSlot {
        static SLOT: DatasetSlot = DatasetSlot::new();
        &SLOT
    }
}

impl ParserStrategy for Labsphere2019 {
    fn parse(&self, repository: &Path) -> std::result::Result<Content, ParseError> {
        let path = repository.join("dataset").join(Self::FILE);
        let text = read_text(&path)?;
        Ok(single(parse_srs_99_020(&text, &path)?))
    }
}

/// Two header rows, then tab-separated `value  wavelength` rows.
pub fn parse_srs_99_020(text: &str, source: &Path) -> std::result::Result<SpectralDistribution, ParseError> {
    let rows = read_pairs(text, 2, source)?;
    let (range, domain): (Vec<f64>, Vec<f64>) = rows.into_iter().map(|[v, w]| (v, w)).unzip();
    SpectralDistribution::new(Labsphere2019::NAME, domain, range)
}

/// Singleton loader for the Labsphere SRS-99-020 dataset.
pub fn build_labsphere2019(load: bool) -> Result<Arc<DatasetLoader>> {
    build::<Labsphere2019>(load)
}
