//! Content checksums for downloaded record files.
//!
//! Zenodo publishes md5 digests; locally curated catalogs use sha256.

use crate::errors::{Result, SyncError};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Md5,
    Sha256,
}

impl Algorithm {
    pub fn prefix(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
        }
    }

    fn hex_len(self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha256 => 64,
        }
    }
}

/// Expected digest of a file, e.g. `md5:0f3c...` or `sha256:9a1e...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum {
    pub algorithm: Algorithm,
    pub hex: String, // lowercase
}

impl Checksum {
    pub fn sha256(hex: &str) -> std::result::Result<Self, String> {
        Self::build(Algorithm::Sha256, hex)
    }

    pub fn md5(hex: &str) -> std::result::Result<Self, String> {
        Self::build(Algorithm::Md5, hex)
    }

    fn build(algorithm: Algorithm, hex: &str) -> std::result::Result<Self, String> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != algorithm.hex_len() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!(
                "expected {} hex digits for {}, got {hex:?}",
                algorithm.hex_len(),
                algorithm.prefix()
            ));
        }
        Ok(Self { algorithm, hex })
    }

    /// Digest of an in-memory buffer, mostly useful for building catalogs.
    pub fn of_bytes(algorithm: Algorithm, bytes: &[u8]) -> Self {
        let hex = match algorithm {
            Algorithm::Md5 => hex::encode(Md5::digest(bytes)),
            Algorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        };
        Self { algorithm, hex }
    }
}

impl FromStr for Checksum {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("md5", hex)) => Self::md5(hex),
            Some(("sha256", hex)) => Self::sha256(hex),
            Some((other, _)) => Err(format!("unsupported checksum algorithm {other:?}")),
            None => Self::sha256(s),
        }
    }
}

impl TryFrom<String> for Checksum {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Checksum> for String {
    fn from(c: Checksum) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.prefix(), self.hex)
    }
}

/// Hash a file in 64 KiB chunks.
pub fn hash_file(path: &Path, algorithm: Algorithm) -> Result<String> {
    match algorithm {
        Algorithm::Md5 => digest_file::<Md5>(path),
        Algorithm::Sha256 => digest_file::<Sha256>(path),
    }
}

fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let mut f = fs::File::open(path)?;
    let mut hasher = D::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check size (when known) and digest of a downloaded file.
pub fn verify_file(name: &str, path: &Path, want: &Checksum, size: Option<u64>) -> Result<()> {
    if let Some(want_size) = size {
        let got = fs::metadata(path)?.len();
        if got != want_size {
            return Err(SyncError::Size {
                name: name.to_string(),
                got,
                want: want_size,
            });
        }
    }

    let got = hash_file(path, want.algorithm)?;
    if got != want.hex {
        return Err(SyncError::Checksum {
            name: name.to_string(),
            got,
            want: want.hex.clone(),
        });
    }
    Ok(())
}
