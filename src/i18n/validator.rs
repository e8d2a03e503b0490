//! Translation file validation.
//!
//! Compares a language's mapping against the default language's mapping:
//! missing keys only cost a fallback, but empty values and broken markup or
//! placeholders would show up on the page.

use crate::i18n::TranslationMapping;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that would show up on the page
    pub errors: Vec<String>,

    /// Problems that degrade gracefully (fallback text, unused keys)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TranslationValidator;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate `candidate` against the default language's `canonical` mapping.
    pub fn validate(
        canonical: &TranslationMapping,
        candidate: &TranslationMapping,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (key, value) in candidate.iter() {
            if value.trim().is_empty() {
                report.errors.push(format!("Empty value for key \"{}\"", key));
                continue;
            }

            let Some(original) = canonical.get(key) else {
                report
                    .warnings
                    .push(format!("Key \"{}\" is not in the default language", key));
                continue;
            };

            let orig_tags = Self::extract_tags(original);
            let trans_tags = Self::extract_tags(value);
            if orig_tags != trans_tags {
                report.errors.push(format!(
                    "Markup mismatch for key \"{}\": default has {:?}, translation has {:?}",
                    key, orig_tags, trans_tags
                ));
            }

            let orig_placeholders = Self::extract_placeholders(original);
            let trans_placeholders = Self::extract_placeholders(value);
            if orig_placeholders != trans_placeholders {
                report.errors.push(format!(
                    "Placeholder mismatch for key \"{}\": default has {:?}, translation has {:?}",
                    key, orig_placeholders, trans_placeholders
                ));
            }
        }

        for key in canonical.keys() {
            if !candidate.contains_key(key) {
                report
                    .warnings
                    .push(format!("Missing key \"{}\" (default text will be shown)", key));
            }
        }

        report
    }

    /// HTML tag names, opening and closing, in order of appearance.
    fn extract_tags(text: &str) -> Vec<String> {
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

        regex
            .find_iter(text)
            .map(|m| {
                let tag = m.as_str();
                let closing = tag.starts_with("</");
                let name = regex
                    .captures(tag)
                    .and_then(|cap| cap.get(1))
                    .map(|n| n.as_str().to_lowercase())
                    .unwrap_or_default();
                if closing {
                    format!("/{}", name)
                } else {
                    name
                }
            })
            .collect()
    }

    /// `{name}` placeholders; order may differ between languages.
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{([a-zA-Z0-9_]+)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
