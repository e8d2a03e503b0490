//! Durable key-value storage for the visitor's language choice.

use crate::i18n::Language;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key current pages read and write.
pub const LANGUAGE_KEY: &str = "selectedLanguage";

/// Key older pages read; written alongside `LANGUAGE_KEY` on every change.
pub const LEGACY_LANGUAGE_KEY: &str = "site_lang";

/// String key-value storage that survives page reloads.
pub trait DurableStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Storage that lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage persisted as a JSON object in a file, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`; a missing file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse storage file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read storage file {}", path.display()))
            }
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        let body = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize storage entries")?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("Failed to write storage file {}", self.path.display()))
    }
}

/// Write the language under both the current and the legacy key.
pub fn persist_language(storage: &mut dyn DurableStorage, language: Language) -> Result<()> {
    storage.set(LANGUAGE_KEY, language.code())?;
    storage.set(LEGACY_LANGUAGE_KEY, language.code())
}

/// Read the persisted language, preferring the current key over the legacy
/// one. Unknown or missing values resolve to the default language.
pub fn restore_language(storage: &dyn DurableStorage) -> Language {
    [LANGUAGE_KEY, LEGACY_LANGUAGE_KEY]
        .iter()
        .filter_map(|key| storage.get(key))
        .find_map(|code| match Language::from_code(&code) {
            Ok(language) => Some(language),
            Err(e) => {
                debug!("Ignoring persisted language: {}", e);
                None
            }
        })
        .unwrap_or_else(Language::canonical)
}
