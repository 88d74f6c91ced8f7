use crate::errors::{Result, SyncError};
use log::{debug, info};
use reqwest::blocking::Client;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Transfer of one remote file to a local path.
///
/// Implementations block; integrity is checked by the caller against the
/// record's checksum once the bytes are on disk.
pub trait Fetch: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking HTTPS download with rustls.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("downloading {url}");
        // Transport errors stay `Net` so the synchronizer can retry them.
        let mut resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(SyncError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = fs::File::create(dest)?;
        let mut buf = [0u8; 128 * 1024];
        let mut total = 0u64;

        loop {
            let n = resp.read(&mut buf)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            total += n as u64;
        }
        out.sync_all()?;

        debug!("{url}: {total} bytes -> {}", dest.display());
        Ok(total)
    }
}
