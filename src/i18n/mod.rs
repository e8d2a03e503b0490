//! Internationalization (i18n) for the site's pages.
//!
//! # Architecture
//!
//! - `registry`: the fixed set of supported languages and their metadata
//! - `language`: validated `Language` type built from the registry
//! - `catalog`: flat key → text mapping for one language
//! - `context`: explicit per-page state (mappings + current language)
//! - `fallback`: ordered lookup strategies (requested → default)
//! - `loader`: fetches translation files with default-language fallback
//! - `translator`: applies mappings to a `Document`
//! - `validator`: checks translation files against the default language
//! - `metrics`: load and lookup counters
//!
//! # Example
//!
//! ```rust,ignore
//! use multilingual_site::i18n::{FsTranslationSource, I18nContext, PageTranslator, TranslationLoader};
//!
//! let loader = TranslationLoader::new(FsTranslationSource::new("site"));
//! let mut ctx = I18nContext::new();
//! loader.load_all("/index.html", &mut ctx).await;
//! PageTranslator::default().translate(&mut ctx, &mut document, &mut storage, Language::RUSSIAN);
//! ```

mod catalog;
mod context;
mod fallback;
mod language;
pub mod loader;
mod metrics;
mod registry;
pub mod translator;
mod validator;

pub use catalog::TranslationMapping;
pub use context::I18nContext;
pub use fallback::{FallbackChain, LookupStrategy, Resolution};
pub use language::Language;
pub use loader::{
    FsTranslationSource, HttpTranslationSource, LoadError, TranslationLoader, TranslationSource,
};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use translator::{plan_translation, PageTranslator, TranslationPlan};
pub use validator::{TranslationValidator, ValidationReport};
