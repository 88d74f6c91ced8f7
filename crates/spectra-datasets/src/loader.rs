use crate::errors::Result;
use crate::parser::{Content, ParserStrategy};
use log::info;
use spectra_records::{Record, Synchronize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Sync + parse behind one idempotent `load`, owning the parsed content.
///
/// `content` is swapped as a whole `Arc`, so readers see either the previous
/// or the new mapping. Loads on one instance run one at a time.
pub struct DatasetLoader {
    record: Record,
    parser: Box<dyn ParserStrategy>,
    synchronizer: Arc<dyn Synchronize>,
    content: RwLock<Option<Arc<Content>>>,
    load_guard: Mutex<()>,
}

impl DatasetLoader {
    pub fn new(
        record: Record,
        parser: Box<dyn ParserStrategy>,
        synchronizer: Arc<dyn Synchronize>,
    ) -> Self {
        Self {
            record,
            parser,
            synchronizer,
            content: RwLock::new(None),
            load_guard: Mutex::new(()),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Latest successfully loaded content, if any.
    pub fn content(&self) -> Option<Arc<Content>> {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Sync the repository, parse it and replace `content`.
    ///
    /// On error the previous content (if any) is left untouched.
    pub fn load(&self) -> Result<Arc<Content>> {
        // Content is only ever swapped whole, so a poisoned guard carries no torn state.
        let _guard = self.load_guard.lock().unwrap_or_else(PoisonError::into_inner);

        self.synchronizer.sync(&self.record)?;
        let parsed = Arc::new(self.parser.parse(&self.record.repository)?);
        info!(
            "dataset {} loaded: {} distribution(s)",
            self.record.id,
            parsed.len()
        );

        *self.content.write().unwrap_or_else(PoisonError::into_inner) = Some(parsed.clone());
        Ok(parsed)
    }
}

impl fmt::Debug for DatasetLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetLoader")
            .field("id", &self.record.id)
            .field("repository", &self.record.repository)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
