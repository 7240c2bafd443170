use std::{
    env,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use thiserror::Error;

use crate::errors::LedgerError;
use crate::report::strings::Locale;
use crate::utils::persistence::{JsonFileStore, KeyValueStore};

/// Overrides the data directory when set.
pub const HOME_ENV: &str = "CONTRIBUTION_LEDGER_HOME";
const DEFAULT_DIR_NAME: &str = ".contribution_ledger";

/// Durable key holding the interface language.
pub const LANGUAGE_KEY: &str = "language";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration storage failed: {0}")]
    Storage(#[from] LedgerError),
    #[error("failed to encode preference: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Returns the application data directory, defaulting to `~/.contribution_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub locale: Locale,
    pub data_dir: PathBuf,
}

/// Reads and writes user preferences through a key-value store.
pub struct ConfigManager {
    store: Box<dyn KeyValueStore>,
    data_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(store: Box<dyn KeyValueStore>, data_dir: PathBuf) -> Self {
        Self { store, data_dir }
    }

    /// Manager backed by JSON files in `data_dir`, usually [`app_data_dir`].
    pub fn open(data_dir: PathBuf) -> Result<Self, ConfigError> {
        let store = JsonFileStore::new(&data_dir)?;
        Ok(Self::new(Box::new(store), data_dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load(&self) -> Config {
        Config {
            locale: self.locale(),
            data_dir: self.data_dir.clone(),
        }
    }

    /// Stored language. Missing, unreadable or unknown values mean English.
    pub fn locale(&self) -> Locale {
        let raw = match self.store.get(LANGUAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Locale::default(),
            Err(err) => {
                tracing::warn!(error = %err, "language preference unreadable");
                return Locale::default();
            }
        };
        serde_json::from_str::<Locale>(&raw)
            .ok()
            .or_else(|| raw.parse().ok())
            .unwrap_or_else(|| {
                tracing::warn!(value = %raw.trim(), "unknown language preference, using English");
                Locale::default()
            })
    }

    pub fn set_locale(&self, locale: Locale) -> Result<(), ConfigError> {
        self.store
            .set(LANGUAGE_KEY, &serde_json::to_string(&locale)?)?;
        tracing::info!(%locale, "language preference saved");
        Ok(())
    }

    /// Switches between the two languages and returns the new one.
    pub fn toggle_locale(&self) -> Result<Locale, ConfigError> {
        let next = self.locale().toggled();
        self.set_locale(next)?;
        Ok(next)
    }
}
