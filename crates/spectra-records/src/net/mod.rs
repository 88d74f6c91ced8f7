mod download;

pub use download::{Fetch, HttpFetcher};
