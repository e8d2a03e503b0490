//! Supported site languages.
//!
//! Built once behind a `OnceLock`. Construction checks that exactly one
//! entry is the default language, so lookups after that cannot fail.

use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Code used in `data-lang` attributes and translation file names
    pub code: &'static str,

    /// Short label for `.current-lang` indicators
    pub label: &'static str,

    pub name: &'static str,
    pub native_name: &'static str,

    /// Terminal fallback for every lookup
    pub is_default: bool,

    /// Offered in the language selector
    pub enabled: bool,
}

static SITE_LANGUAGES: [LanguageConfig; 3] = [
    LanguageConfig {
        code: "en",
        label: "EN",
        name: "English",
        native_name: "English",
        is_default: true,
        enabled: true,
    },
    // "ge" rather than ISO "ka": the code is baked into page markup and file names
    LanguageConfig {
        code: "ge",
        label: "GE",
        name: "Georgian",
        native_name: "ქართული",
        is_default: false,
        enabled: true,
    },
    LanguageConfig {
        code: "ru",
        label: "RU",
        name: "Russian",
        native_name: "Русский",
        is_default: false,
        enabled: true,
    },
];

pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
    default_index: usize,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::build(&SITE_LANGUAGES))
    }

    /// # Panics
    /// Panics unless exactly one enabled entry is the default language.
    fn build(languages: &'static [LanguageConfig]) -> LanguageRegistry {
        let defaults: Vec<usize> = languages
            .iter()
            .enumerate()
            .filter(|(_, lang)| lang.is_default && lang.enabled)
            .map(|(index, _)| index)
            .collect();

        match defaults.as_slice() {
            [index] => LanguageRegistry {
                languages,
                default_index: *index,
            },
            [] => panic!("Language registry has no enabled default language"),
            _ => panic!("Language registry has {} default languages", defaults.len()),
        }
    }

    /// Look up a language by code, enabled or not. Codes are case-sensitive.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Enabled languages in selector order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    pub fn canonical(&self) -> &LanguageConfig {
        &self.languages[self.default_index]
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code).is_some_and(|lang| lang.enabled)
    }
}
