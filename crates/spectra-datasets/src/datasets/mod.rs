mod labsphere2019;

pub use labsphere2019::{build_labsphere2019, parse_srs_99_020, Labsphere2019};
