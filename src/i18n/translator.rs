//! Page translator: applies loaded mappings to a document.
//!
//! `plan_translation` is the pure part (language + mappings in, text
//! assignments out). `PageTranslator::translate` applies a plan and then
//! updates everything else a language switch touches: persisted choice,
//! language indicators and the active language option.

use crate::document::{markers, Document, ElementId};
use crate::i18n::{FallbackChain, I18nContext, Language, TranslationMetrics};
use crate::storage::{persist_language, DurableStorage};
use tracing::{debug, warn};

/// New text for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAssignment {
    pub element: ElementId,
    pub key: String,
    pub text: String,
    /// Language whose mapping supplied the text.
    pub source: Language,
}

/// Key found in no mapping; the element keeps its authored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub element: ElementId,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationPlan {
    pub assignments: Vec<TextAssignment>,
    pub missing: Vec<MissingKey>,
}

impl TranslationPlan {
    /// Assignments served by a language other than `requested`.
    pub fn fallbacks(&self, requested: Language) -> impl Iterator<Item = &TextAssignment> {
        self.assignments
            .iter()
            .filter(move |a| a.source != requested)
    }

    pub fn fallback_count(&self, requested: Language) -> usize {
        self.fallbacks(requested).count()
    }
}

/// Resolve every `(element, key)` target through the fallback chain.
pub fn plan_translation<'a, I>(
    ctx: &I18nContext,
    chain: &FallbackChain,
    language: Language,
    targets: I,
) -> TranslationPlan
where
    I: IntoIterator<Item = (ElementId, &'a str)>,
{
    let mut plan = TranslationPlan::default();

    for (element, key) in targets {
        match chain.resolve(ctx, language, key) {
            Some(resolution) => plan.assignments.push(TextAssignment {
                element,
                key: key.to_string(),
                text: resolution.text.to_string(),
                source: resolution.source,
            }),
            None => plan.missing.push(MissingKey {
                element,
                key: key.to_string(),
            }),
        }
    }

    plan
}

#[derive(Debug, Clone, Default)]
pub struct PageTranslator {
    chain: FallbackChain,
}

impl PageTranslator {
    pub fn new(chain: FallbackChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Build the plan for `document` without touching it.
    pub fn plan(&self, ctx: &I18nContext, document: &Document, language: Language) -> TranslationPlan {
        plan_translation(
            ctx,
            &self.chain,
            language,
            document.select_by_attr(markers::TRANSLATE_ATTR),
        )
    }

    /// Translate the page to `language` and record it as the current language.
    pub fn translate(
        &self,
        ctx: &mut I18nContext,
        document: &mut Document,
        storage: &mut dyn DurableStorage,
        language: Language,
    ) {
        debug!("Translating page to {}", language);
        let plan = self.plan(ctx, document, language);
        record_plan_metrics(&plan, language);

        for missing in &plan.missing {
            warn!(
                "Missing translation for key \"{}\" in language \"{}\"",
                missing.key, language
            );
        }
        for fallback in plan.fallbacks(language) {
            debug!(
                "Key \"{}\" has no {} translation, using {}",
                fallback.key, language, fallback.source
            );
        }
        for assignment in plan.assignments {
            document.set_text(assignment.element, assignment.text);
        }

        if let Err(e) = persist_language(storage, language) {
            warn!("Failed to persist language {}: {:#}", language, e);
        }
        ctx.set_language(language);

        update_language_display(document, language);
        update_active_options(document, language);
    }
}

fn record_plan_metrics(plan: &TranslationPlan, language: Language) {
    let metrics = TranslationMetrics::global();
    for assignment in &plan.assignments {
        if assignment.source == language {
            metrics.record_key_resolved();
        } else {
            metrics.record_key_fallback();
        }
    }
    for _ in &plan.missing {
        metrics.record_key_missing();
    }
}

/// Show the language code in every `.current-lang` element.
fn update_language_display(document: &mut Document, language: Language) {
    let code = language.display_code();
    for id in document.select_by_class(markers::CURRENT_LANG_CLASS) {
        document.set_text(id, code);
    }
}

/// Mark exactly the options for `language` as active.
pub(crate) fn update_active_options(document: &mut Document, language: Language) {
    for id in document.select_by_class(markers::LANGUAGE_OPTION_CLASS) {
        let selected = document
            .element(id)
            .and_then(|e| e.attr(markers::LANG_ATTR))
            .is_some_and(|code| code == language.code());

        if selected {
            document.add_class(id, markers::ACTIVE_CLASS);
        } else {
            document.remove_class(id, markers::ACTIVE_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::markers::*;
    use crate::document::Element;
    use crate::i18n::LookupStrategy;
    use crate::storage::{MemoryStorage, LANGUAGE_KEY, LEGACY_LANGUAGE_KEY};

    // ==================== Helpers ====================

    fn scenario_context() -> I18nContext {
        let mut ctx = I18nContext::new();
        ctx.set_mapping(
            Language::ENGLISH,
            [("greeting", "Hello")].into_iter().collect(),
        );
        ctx.set_mapping(Language::GEORGIAN, Default::default());
        ctx.set_mapping(
            Language::RUSSIAN,
            [("greeting", "გამარჯობა")].into_iter().collect(),
        );
        ctx
    }

    struct Page {
        doc: Document,
        greeting: ElementId,
        untranslated: ElementId,
        indicator: ElementId,
        options: Vec<(Language, ElementId)>,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let greeting = doc.append(
            None,
            Element::new("h1")
                .with_attr(TRANSLATE_ATTR, "greeting")
                .with_text("Hi (authored)"),
        );
        let untranslated = doc.append(
            None,
            Element::new("p")
                .with_attr(TRANSLATE_ATTR, "nowhere")
                .with_text("Authored text"),
        );
        let selector = doc.append(None, Element::new("div").with_class(LANGUAGE_SELECTOR_CLASS));
        let button = doc.append(
            Some(selector),
            Element::new("button").with_class(LANGUAGE_BUTTON_CLASS),
        );
        let indicator = doc.append(
            Some(button),
            Element::new("span").with_class(CURRENT_LANG_CLASS).with_text("EN"),
        );
        let dropdown = doc.append(
            Some(selector),
            Element::new("div").with_class(LANGUAGE_DROPDOWN_CLASS),
        );
        let options = Language::all()
            .into_iter()
            .map(|lang| {
                let id = doc.append(
                    Some(dropdown),
                    Element::new("a")
                        .with_class(LANGUAGE_OPTION_CLASS)
                        .with_attr(LANG_ATTR, lang.code()),
                );
                (lang, id)
            })
            .collect();

        Page {
            doc,
            greeting,
            untranslated,
            indicator,
            options,
        }
    }

    // ==================== plan_translation Tests ====================

    #[test]
    fn test_plan_uses_requested_then_default() {
        let ctx = scenario_context();
        let chain = FallbackChain::standard();
        let targets = vec![(0, "greeting"), (1, "nowhere")];

        let plan = plan_translation(&ctx, &chain, Language::GEORGIAN, targets);

        assert_eq!(
            plan.assignments,
            vec![TextAssignment {
                element: 0,
                key: "greeting".to_string(),
                text: "Hello".to_string(),
                source: Language::ENGLISH,
            }]
        );
        assert_eq!(
            plan.missing,
            vec![MissingKey {
                element: 1,
                key: "nowhere".to_string(),
            }]
        );
        assert_eq!(plan.fallback_count(Language::GEORGIAN), 1);
    }

    #[test]
    fn test_plan_lists_fallback_keys() {
        let ctx = scenario_context();
        let targets = vec![(0, "greeting"), (1, "greeting")];

        let plan = plan_translation(&ctx, &FallbackChain::standard(), Language::GEORGIAN, targets);

        let keys: Vec<_> = plan
            .fallbacks(Language::GEORGIAN)
            .map(|a| (a.element, a.key.as_str()))
            .collect();
        assert_eq!(keys, vec![(0, "greeting"), (1, "greeting")]);

        let chain = FallbackChain::standard();
        let plan = plan_translation(&ctx, &chain, Language::RUSSIAN, vec![(0, "greeting")]);
        assert_eq!(plan.fallbacks(Language::RUSSIAN).count(), 0);
    }

    #[test]
    fn test_plan_with_requested_only_chain() {
        let ctx = scenario_context();
        let chain = FallbackChain::new(vec![LookupStrategy::Requested]);

        let plan = plan_translation(&ctx, &chain, Language::GEORGIAN, vec![(0, "greeting")]);
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.missing.len(), 1);
    }

    #[test]
    fn test_plan_with_no_targets() {
        let ctx = scenario_context();
        let plan = plan_translation(
            &ctx,
            &FallbackChain::standard(),
            Language::RUSSIAN,
            Vec::<(ElementId, &str)>::new(),
        );
        assert_eq!(plan, TranslationPlan::default());
    }

    // ==================== translate Tests ====================

    #[test]
    fn test_scenario_switching_languages() {
        let mut ctx = scenario_context();
        let mut page = page();
        let mut storage = MemoryStorage::new();
        let translator = PageTranslator::default();

        translator.translate(&mut ctx, &mut page.doc, &mut storage, Language::GEORGIAN);
        assert_eq!(page.doc.text(page.greeting), Some("Hello"));

        translator.translate(&mut ctx, &mut page.doc, &mut storage, Language::RUSSIAN);
        assert_eq!(page.doc.text(page.greeting), Some("გამარჯობა"));

        translator.translate(&mut ctx, &mut page.doc, &mut storage, Language::ENGLISH);
        assert_eq!(page.doc.text(page.greeting), Some("Hello"));
    }

    #[test]
    fn test_missing_key_keeps_authored_text() {
        let mut ctx = scenario_context();
        let mut page = page();
        let mut storage = MemoryStorage::new();

        PageTranslator::default().translate(&mut ctx, &mut page.doc, &mut storage, Language::RUSSIAN);

        assert_eq!(page.doc.text(page.untranslated), Some("Authored text"));
    }

    #[test]
    fn test_empty_default_mapping_keeps_authored_text() {
        let mut ctx = I18nContext::new();
        let mut page = page();
        let mut storage = MemoryStorage::new();

        PageTranslator::default().translate(&mut ctx, &mut page.doc, &mut storage, Language::GEORGIAN);

        assert_eq!(page.doc.text(page.greeting), Some("Hi (authored)"));
        assert_eq!(page.doc.text(page.indicator), Some("GE"));
    }

    #[test]
    fn test_translate_persists_both_keys_and_sets_current() {
        let mut ctx = scenario_context();
        let mut page = page();
        let mut storage = MemoryStorage::new();

        PageTranslator::default().translate(&mut ctx, &mut page.doc, &mut storage, Language::RUSSIAN);

        assert_eq!(ctx.current_language(), Language::RUSSIAN);
        assert_eq!(storage.get(LANGUAGE_KEY).as_deref(), Some("ru"));
        assert_eq!(storage.get(LEGACY_LANGUAGE_KEY).as_deref(), Some("ru"));
    }

    #[test]
    fn test_translate_updates_indicator_and_active_option() {
        let mut ctx = scenario_context();
        let mut page = page();
        let mut storage = MemoryStorage::new();
        let translator = PageTranslator::default();

        translator.translate(&mut ctx, &mut page.doc, &mut storage, Language::GEORGIAN);
        translator.translate(&mut ctx, &mut page.doc, &mut storage, Language::RUSSIAN);

        assert_eq!(page.doc.text(page.indicator), Some("RU"));
        for (lang, id) in &page.options {
            assert_eq!(
                page.doc.has_class(*id, ACTIVE_CLASS),
                *lang == Language::RUSSIAN,
                "option {} has wrong active state",
                lang
            );
        }
    }

    #[test]
    fn test_storage_failure_does_not_abort_translation() {
        struct ReadOnlyStorage;

        impl DurableStorage for ReadOnlyStorage {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }

            fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
                anyhow::bail!("storage is read-only")
            }
        }

        let mut ctx = scenario_context();
        let mut page = page();

        PageTranslator::default().translate(&mut ctx, &mut page.doc, &mut ReadOnlyStorage, Language::RUSSIAN);

        assert_eq!(page.doc.text(page.greeting), Some("გამარჯობა"));
        assert_eq!(ctx.current_language(), Language::RUSSIAN);
        assert_eq!(page.doc.text(page.indicator), Some("RU"));
    }
}
