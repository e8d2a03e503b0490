//! One page view: the document, its i18n state and the visitor's storage.

use crate::controller::{LanguageSwitchController, UiEvent};
use crate::document::Document;
use crate::i18n::translator::update_active_options;
use crate::i18n::{
    I18nContext, Language, PageTranslator, TranslationLoader, TranslationMetrics,
    TranslationSource,
};
use crate::storage::{restore_language, DurableStorage};
use tracing::{debug, info};

pub struct SiteSession<S, St> {
    document: Document,
    page_path: String,
    ctx: I18nContext,
    loader: TranslationLoader<S>,
    translator: PageTranslator,
    controller: LanguageSwitchController,
    storage: St,
}

impl<S, St> SiteSession<S, St>
where
    S: TranslationSource,
    St: DurableStorage,
{
    pub fn new(
        document: Document,
        page_path: impl Into<String>,
        loader: TranslationLoader<S>,
        storage: St,
    ) -> Self {
        Self {
            document,
            page_path: page_path.into(),
            ctx: I18nContext::new(),
            loader,
            translator: PageTranslator::default(),
            controller: LanguageSwitchController::new(),
            storage,
        }
    }

    pub fn with_translator(mut self, translator: PageTranslator) -> Self {
        self.translator = translator;
        self
    }

    /// Page-load sequence: restore the persisted language, wait for every
    /// translation file to settle, then translate the page.
    pub async fn initialize(&mut self) {
        let language = restore_language(&self.storage);
        info!("Initializing page {} in {}", self.page_path, language);
        self.ctx.set_language(language);
        update_active_options(&mut self.document, language);

        self.loader.load_all(&self.page_path, &mut self.ctx).await;
        self.apply(language);
    }

    /// Handle a UI event; a language request re-fetches that language only
    /// when its mapping is empty.
    pub async fn dispatch(&mut self, event: UiEvent) -> Option<Language> {
        let language = self.controller.handle(&mut self.document, event)?;

        if !self.ctx.has_mapping(language) {
            debug!("No {} translations in memory, fetching again", language);
            let base = self.loader.base_for(&self.page_path);
            let mapping = self.loader.load_language(base, language).await;
            self.ctx.set_mapping(language, mapping);
        }

        self.apply(language);
        Some(language)
    }

    fn apply(&mut self, language: Language) {
        self.translator
            .translate(&mut self.ctx, &mut self.document, &mut self.storage, language);
        debug!(
            "Translation metrics: {:?}",
            TranslationMetrics::global().report()
        );
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn context(&self) -> &I18nContext {
        &self.ctx
    }

    pub fn storage(&self) -> &St {
        &self.storage
    }

    pub fn current_language(&self) -> Language {
        self.ctx.current_language()
    }
}
