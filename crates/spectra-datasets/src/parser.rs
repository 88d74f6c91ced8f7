use crate::errors::ParseError;
use crate::sd::SpectralDistribution;
use std::collections::BTreeMap;
use std::path::Path;

/// Distribution name -> distribution; the uniform shape every dataset loads into.
pub type Content = BTreeMap<String, SpectralDistribution>;

/// Dataset-specific conversion of a verified repository into [`Content`].
///
/// Implementations read only below `repository`, touch no shared state and
/// return identical content for identical files.
pub trait ParserStrategy: Send + Sync {
    fn parse(&self, repository: &Path) -> Result<Content, ParseError>;
}

impl<F> ParserStrategy for F
where
    F: Fn(&Path) -> Result<Content, ParseError> + Send + Sync,
{
    fn parse(&self, repository: &Path) -> Result<Content, ParseError> {
        self(repository)
    }
}

/// Content holding a single distribution, keyed by its name.
pub fn single(sd: SpectralDistribution) -> Content {
    let mut content = Content::new();
    content.insert(sd.name().to_string(), sd);
    content
}
