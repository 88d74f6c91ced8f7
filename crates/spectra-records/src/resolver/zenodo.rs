use super::RecordResolver;
use crate::config::Settings;
use crate::errors::{ResolveError, SyncError};
use crate::paths::repository_dir;
use crate::types::{Record, RecordFile};
use crate::verify::Checksum;
use anyhow::Context;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Resolves ids as Zenodo record numbers via `GET {api}/records/{id}`.
///
/// Records are immutable, so each id is looked up at most once per resolver.
pub struct ZenodoResolver {
    api: String,
    home: PathBuf,
    client: Client,
    cache: Mutex<HashMap<String, Record>>,
}

impl ZenodoResolver {
    pub fn new(api: &str, home: &Path, client: Client) -> Self {
        Self {
            api: api.trim_end_matches('/').to_string(),
            home: home.to_path_buf(),
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(settings.sync.timeout()).build()?;
        Ok(Self::new(&settings.zenodo_api, &settings.home_dir(), client))
    }

    fn fetch_record(&self, id: &str) -> Result<Option<ZenodoRecord>, SyncError> {
        let url = format!("{}/records/{id}", self.api);
        info!("resolving record {id} from {url}");
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .with_context(|| format!("GET {url}"))?;

        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(None),
            s if !s.is_success() => Err(SyncError::Status {
                url,
                status: s.as_u16(),
            }),
            _ => {
                let txt = resp.text()?;
                let rec: ZenodoRecord = serde_json::from_str(&txt)
                    .with_context(|| format!("invalid record JSON from {url}"))?;
                Ok(Some(rec))
            }
        }
    }
}

impl RecordResolver for ZenodoResolver {
    fn resolve(&self, id: &str) -> Result<Record, ResolveError> {
        if let Some(r) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(id) {
            return Ok(r.clone());
        }

        let lookup = |source| ResolveError::Lookup {
            id: id.to_string(),
            source,
        };
        let raw = self
            .fetch_record(id)
            .map_err(lookup)?
            .ok_or_else(|| ResolveError::UnknownDataset(id.to_string()))?;
        let record = raw
            .into_record(id, &repository_dir(&self.home, id))
            .map_err(lookup)?;
        debug!("record {id}: {} file(s)", record.files.len());

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), record.clone());
        Ok(record)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Zenodo REST shapes (only the fields we use)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ZenodoRecord {
    metadata: ZenodoMetadata,
    #[serde(default)]
    files: Vec<ZenodoFile>,
}

#[derive(Debug, Deserialize)]
struct ZenodoMetadata {
    title: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZenodoFile {
    #[serde(alias = "filename")]
    key: String,
    #[serde(default, alias = "filesize")]
    size: Option<u64>,
    checksum: String,
    links: ZenodoLinks,
}

#[derive(Debug, Deserialize)]
struct ZenodoLinks {
    #[serde(rename = "self", alias = "download")]
    content: String,
}

impl ZenodoRecord {
    fn into_record(self, id: &str, repository: &Path) -> Result<Record, SyncError> {
        let mut files = Vec::with_capacity(self.files.len());
        for f in self.files {
            // Zenodo omits the prefix on some legacy records; those are md5.
            let checksum = if f.checksum.contains(':') {
                f.checksum.parse::<Checksum>()
            } else {
                Checksum::md5(&f.checksum)
            }
            .map_err(|e| SyncError::Msg(format!("{}: {e}", f.key)))?;

            files.push(RecordFile {
                name: f.key,
                url: f.links.content,
                checksum,
                size: f.size,
            });
        }

        let record = Record {
            id: id.to_string(),
            title: self.metadata.title,
            version: self.metadata.version,
            repository: repository.to_path_buf(),
            files,
        };
        // file keys are remote input and become paths under the repository
        record.check_names()?;
        Ok(record)
    }
}
