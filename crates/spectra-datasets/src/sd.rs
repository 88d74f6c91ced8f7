use crate::errors::ParseError;
use serde::{Deserialize, Serialize};

/// A named wavelength -> value curve.
///
/// The domain is strictly increasing and pairs positionally with the range;
/// both are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralDistribution {
    name: String,
    domain: Vec<f64>,
    range: Vec<f64>,
}

impl SpectralDistribution {
    pub fn new(
        name: impl Into<String>,
        domain: Vec<f64>,
        range: Vec<f64>,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        if domain.len() != range.len() {
            return Err(ParseError::DimensionMismatch {
                name,
                domain: domain.len(),
                range: range.len(),
            });
        }
        if domain.is_empty() {
            return Err(ParseError::Empty { name });
        }
        for (i, pair) in domain.windows(2).enumerate() {
            // also rejects NaN
            if !(pair[1] > pair[0]) {
                return Err(ParseError::NonMonotonic {
                    name,
                    index: i + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self {
            name,
            domain,
            range,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn range(&self) -> &[f64] {
        &self.range
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Value at an exact sample wavelength.
    pub fn get(&self, wavelength: f64) -> Option<f64> {
        self.domain
            .binary_search_by(|w| w.total_cmp(&wavelength))
            .ok()
            .map(|i| self.range[i])
    }

    /// (wavelength, value) pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.domain.iter().copied().zip(self.range.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_lookup_and_iteration() {
        let sd = SpectralDistribution::new("flat", vec![400.0, 500.0], vec![0.5, 0.6]).unwrap();
        assert_eq!(sd.get(500.0), Some(0.6));
        assert_eq!(sd.get(450.0), None);
        assert_eq!(sd.iter().collect::<Vec<_>>(), vec![(400.0, 0.5), (500.0, 0.6)]);
        assert_eq!(sd.len(), 2);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = SpectralDistribution::new("x", vec![400.0, 500.0], vec![0.5]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DimensionMismatch {
                domain: 2,
                range: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_repeated_or_descending_wavelengths() {
        let err =
            SpectralDistribution::new("x", vec![400.0, 500.0, 500.0], vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, ParseError::NonMonotonic { index: 2, .. }));

        let err = SpectralDistribution::new("x", vec![500.0, 400.0], vec![1.0; 2]).unwrap_err();
        assert!(matches!(err, ParseError::NonMonotonic { index: 1, .. }));

        let err = SpectralDistribution::new("x", vec![400.0, f64::NAN], vec![1.0; 2]).unwrap_err();
        assert!(matches!(err, ParseError::NonMonotonic { .. }));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            SpectralDistribution::new("x", vec![], vec![]),
            Err(ParseError::Empty { .. })
        ));
    }
}
