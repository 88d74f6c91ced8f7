//! Process-wide resolver + synchronizer used by the dataset singletons.

use crate::errors::Result;
use once_cell::sync::OnceCell;
use spectra_records::{RecordResolver, Settings, Synchronize, Synchronizer, ZenodoResolver};
use std::sync::Arc;

#[derive(Clone)]
pub struct Environment {
    pub resolver: Arc<dyn RecordResolver>,
    pub synchronizer: Arc<dyn Synchronize>,
}

impl Environment {
    pub fn new(resolver: Arc<dyn RecordResolver>, synchronizer: Arc<dyn Synchronize>) -> Self {
        Self {
            resolver,
            synchronizer,
        }
    }

    /// Zenodo records synced over HTTPS into `settings.home_dir()`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let resolver = ZenodoResolver::from_settings(settings)?;
        let synchronizer = Synchronizer::http(settings.sync.clone())?;
        Ok(Self::new(Arc::new(resolver), Arc::new(synchronizer)))
    }
}

static ENVIRONMENT: OnceCell<Environment> = OnceCell::new();

/// Install the environment before any dataset is built.
///
/// Returns the rejected value if one is already in place.
pub fn install_environment(env: Environment) -> std::result::Result<(), Environment> {
    ENVIRONMENT.set(env)
}

/// The installed environment, or one built from [`Settings::load`] on first use.
pub fn environment() -> Result<&'static Environment> {
    ENVIRONMENT.get_or_try_init(|| Environment::from_settings(&Settings::load()?))
}
