//! Per-page i18n state: loaded mappings plus the current language.

use crate::i18n::{Language, TranslationMapping};
use std::collections::HashMap;

/// Process-scoped i18n state, passed explicitly to the loader and translator.
///
/// Starts with an empty mapping for every supported language and the
/// default language selected.
#[derive(Debug, Clone)]
pub struct I18nContext {
    mappings: HashMap<Language, TranslationMapping>,
    current: Language,
}

impl I18nContext {
    pub fn new() -> Self {
        Self {
            mappings: Language::all()
                .into_iter()
                .map(|lang| (lang, TranslationMapping::new()))
                .collect(),
            current: Language::canonical(),
        }
    }

    pub fn current_language(&self) -> Language {
        self.current
    }

    pub fn set_language(&mut self, language: Language) {
        self.current = language;
    }

    pub fn set_mapping(&mut self, language: Language, mapping: TranslationMapping) {
        self.mappings.insert(language, mapping);
    }

    /// Mapping for a language; empty when it never loaded.
    pub fn mapping(&self, language: Language) -> &TranslationMapping {
        static EMPTY: TranslationMapping = TranslationMapping::new();
        self.mappings.get(&language).unwrap_or(&EMPTY)
    }

    /// Whether a language has a usable (non-empty) mapping.
    pub fn has_mapping(&self, language: Language) -> bool {
        !self.mapping(language).is_empty()
    }
}

impl Default for I18nContext {
    fn default() -> Self {
        Self::new()
    }
}
