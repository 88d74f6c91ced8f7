//! Small text readers shared by dataset parser strategies.

use crate::errors::ParseError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a dataset file, mapping "not found" to [`ParseError::Missing`].
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ParseError::Missing {
            path: path.to_path_buf(),
        },
        _ => ParseError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Rows of exactly two numbers separated by tabs or spaces.
///
/// The first `skip_rows` lines are headers; blank lines are ignored.
/// `source` only feeds error messages.
pub fn read_pairs(text: &str, skip_rows: usize, source: &Path) -> Result<Vec<[f64; 2]>, ParseError> {
    let malformed = |line: usize, message: String| ParseError::Malformed {
        path: source.to_path_buf(),
        line,
        message,
    };

    let mut rows = Vec::new();
    for (idx, raw) in text.lines().enumerate().skip(skip_rows) {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(malformed(
                line,
                format!("expected 2 columns, found {}", fields.len()),
            ));
        }

        let mut pair = [0.0; 2];
        for (slot, field) in pair.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|_| malformed(line, format!("{field:?} is not a number")))?;
        }
        rows.push(pair);
    }
    Ok(rows)
}
