//! Translation loader: fetches one flat JSON file per language.
//!
//! Files live at `{base}translations/{lang}.json`, where `base` depends on
//! how deep the current page sits. A language whose file cannot be fetched
//! or parsed degrades to the default language's file; nothing here returns
//! an error to the caller.

use crate::config::{default_section_markers, Config};
use crate::i18n::{I18nContext, Language, TranslationMapping, TranslationMetrics};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Base used by pages nested under a section directory.
pub const PARENT_BASE: &str = "../";
/// Base used by top-level pages.
pub const SAME_LEVEL_BASE: &str = "";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{location} returned status {status}")]
    Status { location: String, status: u16 },

    #[error("request for {location} failed: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} is not a flat translation file: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve translation path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Where translation files come from.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// Fetch and parse the file at `path`, relative to the current page.
    async fn fetch(&self, path: &str) -> Result<TranslationMapping, LoadError>;
}

/// Fetches translation files over HTTP, relative to the page URL.
#[derive(Debug, Clone)]
pub struct HttpTranslationSource {
    client: reqwest::Client,
    page_url: reqwest::Url,
}

impl HttpTranslationSource {
    pub fn new(client: reqwest::Client, page_url: &str) -> anyhow::Result<Self> {
        let page_url = reqwest::Url::parse(page_url)
            .map_err(|e| anyhow::anyhow!("Invalid page URL {}: {}", page_url, e))?;
        Ok(Self { client, page_url })
    }

    /// Path component of the page URL, used to pick the base path.
    pub fn page_path(&self) -> &str {
        self.page_url.path()
    }
}

#[async_trait]
impl TranslationSource for HttpTranslationSource {
    async fn fetch(&self, path: &str) -> Result<TranslationMapping, LoadError> {
        let url = self
            .page_url
            .join(path)
            .map_err(|e| LoadError::InvalidPath {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let location = url.to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                location: location.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                location,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| LoadError::Transport {
                location: location.clone(),
                source,
            })?;

        TranslationMapping::from_json(&body)
            .map_err(|source| LoadError::Malformed { location, source })
    }
}

/// Reads translation files from disk, relative to the page's directory.
#[derive(Debug, Clone)]
pub struct FsTranslationSource {
    page_dir: PathBuf,
}

impl FsTranslationSource {
    pub fn new(page_dir: impl Into<PathBuf>) -> Self {
        Self {
            page_dir: page_dir.into(),
        }
    }
}

#[async_trait]
impl TranslationSource for FsTranslationSource {
    async fn fetch(&self, path: &str) -> Result<TranslationMapping, LoadError> {
        let full_path = self.page_dir.join(path);
        let body = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|source| LoadError::Io {
                path: full_path.clone(),
                source,
            })?;

        TranslationMapping::from_json(&body).map_err(|source| LoadError::Malformed {
            location: full_path.display().to_string(),
            source,
        })
    }
}

/// Base path for a page: one level up when the path contains any section marker.
pub fn base_path<S: AsRef<str>>(page_path: &str, section_markers: &[S]) -> &'static str {
    if section_markers
        .iter()
        .any(|marker| page_path.contains(marker.as_ref()))
    {
        PARENT_BASE
    } else {
        SAME_LEVEL_BASE
    }
}

pub fn translation_path(base: &str, language: Language) -> String {
    format!("{}translations/{}.json", base, language.code())
}

pub struct TranslationLoader<S> {
    source: S,
    section_markers: Vec<String>,
}

impl<S: TranslationSource> TranslationLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            section_markers: default_section_markers(),
        }
    }

    /// Loader using the configured section markers.
    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(source).with_section_markers(config.section_markers.clone())
    }

    pub fn with_section_markers(mut self, markers: Vec<String>) -> Self {
        self.section_markers = markers;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn base_for(&self, page_path: &str) -> &'static str {
        base_path(page_path, &self.section_markers)
    }

    /// Load one language. On failure the mapping is empty, except that a
    /// non-default language gets one attempt at the default language's file.
    pub async fn load_language(&self, base: &str, language: Language) -> TranslationMapping {
        let metrics = TranslationMetrics::global();
        let path = translation_path(base, language);
        debug!("Loading {} translations from {}", language, path);

        let err = match self.source.fetch(&path).await {
            Ok(mapping) => {
                metrics.record_file_loaded();
                debug!("Loaded {} translations for {}", mapping.len(), language);
                return mapping;
            }
            Err(e) => e,
        };

        metrics.record_load_failure();
        warn!("Failed to load {} translations: {}", language, err);

        if language.is_canonical() {
            return TranslationMapping::new();
        }

        let canonical = Language::canonical();
        let fallback_path = translation_path(base, canonical);
        match self.source.fetch(&fallback_path).await {
            Ok(mapping) => {
                metrics.record_file_loaded();
                metrics.record_default_substitution();
                debug!(
                    "Using {} translations as fallback for {}",
                    canonical, language
                );
                mapping
            }
            Err(e) => {
                metrics.record_load_failure();
                error!(
                    "Failed to load {} fallback translations for {}: {}",
                    canonical, language, e
                );
                TranslationMapping::new()
            }
        }
    }

    /// Load every supported language concurrently and store the results.
    /// Returns once all loads have settled.
    pub async fn load_all(&self, page_path: &str, ctx: &mut I18nContext) {
        let base = self.base_for(page_path);
        debug!("Computed translation base '{}' for page {}", base, page_path);

        let loads = Language::all().into_iter().map(|language| async move {
            (language, self.load_language(base, language).await)
        });

        for (language, mapping) in join_all(loads).await {
            ctx.set_mapping(language, mapping);
        }
    }
}
