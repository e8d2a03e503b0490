//! Ordered lookup strategies for resolving a translation key.
//!
//! A lookup walks the chain once and stops at the first hit. When every
//! strategy misses, the caller keeps the element's authored text.

use crate::i18n::{I18nContext, Language};

/// Where a strategy looks for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// The mapping of the language being displayed.
    Requested,
    /// The default language's mapping.
    Canonical,
}

impl LookupStrategy {
    fn language(self, requested: Language) -> Language {
        match self {
            LookupStrategy::Requested => requested,
            LookupStrategy::Canonical => Language::canonical(),
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub text: &'a str,
    /// Language whose mapping supplied the text.
    pub source: Language,
    pub strategy: LookupStrategy,
}

impl Resolution<'_> {
    /// Whether the text came from a later strategy than the first one.
    pub fn is_fallback(&self) -> bool {
        self.strategy != LookupStrategy::Requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    strategies: Vec<LookupStrategy>,
}

impl FallbackChain {
    pub fn new(strategies: Vec<LookupStrategy>) -> Self {
        Self { strategies }
    }

    /// Requested language first, then the default language.
    pub fn standard() -> Self {
        Self::new(vec![LookupStrategy::Requested, LookupStrategy::Canonical])
    }

    pub fn strategies(&self) -> &[LookupStrategy] {
        &self.strategies
    }

    pub fn resolve<'a>(
        &self,
        ctx: &'a I18nContext,
        requested: Language,
        key: &str,
    ) -> Option<Resolution<'a>> {
        self.strategies.iter().find_map(|&strategy| {
            let source = strategy.language(requested);
            ctx.mapping(source).get(key).map(|text| Resolution {
                text,
                source,
                strategy,
            })
        })
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::standard()
    }
}
