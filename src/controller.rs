//! Language switch controller: turns clicks into translator requests and
//! keeps the dropdown and mobile-menu state consistent.

use crate::document::{markers, Document, ElementId};
use crate::i18n::Language;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// A click whose innermost target is `target`.
    Click { target: ElementId },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageSwitchController;

impl LanguageSwitchController {
    pub fn new() -> Self {
        Self
    }

    /// Apply the UI side of an event and return the language to switch to, if any.
    pub fn handle(&self, document: &mut Document, event: UiEvent) -> Option<Language> {
        let UiEvent::Click { target } = event;
        let mut requested = None;

        if let Some(option) = document.closest_with_class(target, markers::LANGUAGE_OPTION_CLASS) {
            requested = self.choose_language(document, option);
        } else if let Some(button) =
            document.closest_with_class(target, markers::LANGUAGE_BUTTON_CLASS)
        {
            toggle_dropdown(document, button);
        } else if is_mobile_menu_button(document, target) {
            toggle_mobile_menu(document);
        } else if is_mobile_menu_link(document, target) {
            close_mobile_menu(document);
        }

        // Clicks anywhere outside a selector collapse every dropdown
        if document
            .closest_with_class(target, markers::LANGUAGE_SELECTOR_CLASS)
            .is_none()
        {
            close_dropdowns(document, None);
        }

        requested
    }

    fn choose_language(&self, document: &mut Document, option: ElementId) -> Option<Language> {
        let code = document
            .element(option)
            .and_then(|e| e.attr(markers::LANG_ATTR))
            .map(str::to_string);

        close_dropdowns(document, None);
        close_mobile_menu(document);

        let code = code?;
        match Language::from_code(&code) {
            Ok(language) => {
                debug!("Language option selected: {}", language);
                Some(language)
            }
            Err(e) => {
                warn!("Ignoring language option: {}", e);
                None
            }
        }
    }
}

fn close_dropdowns(document: &mut Document, except: Option<ElementId>) {
    for dropdown in document.select_by_class(markers::LANGUAGE_DROPDOWN_CLASS) {
        if Some(dropdown) != except {
            document.remove_class(dropdown, markers::ACTIVE_CLASS);
        }
    }
}

fn toggle_dropdown(document: &mut Document, button: ElementId) {
    let dropdown = document.next_sibling(button);
    close_dropdowns(document, dropdown);
    if let Some(dropdown) = dropdown {
        document.toggle_class(dropdown, markers::ACTIVE_CLASS);
    }
}

fn mobile_menu(document: &Document) -> Option<(ElementId, ElementId)> {
    Some((
        document.get_by_id(markers::MOBILE_MENU_ID)?,
        document.get_by_id(markers::MOBILE_MENU_BUTTON_ID)?,
    ))
}

fn is_mobile_menu_button(document: &Document, target: ElementId) -> bool {
    document
        .closest(target, |e| e.id() == Some(markers::MOBILE_MENU_BUTTON_ID))
        .is_some()
}

fn is_mobile_menu_link(document: &Document, target: ElementId) -> bool {
    document
        .closest(target, |e| e.tag() == "a")
        .and_then(|link| document.closest_with_class(link, markers::MOBILE_MENU_CLASS))
        .is_some()
}

fn toggle_mobile_menu(document: &mut Document) {
    let Some((menu, button)) = mobile_menu(document) else {
        return;
    };
    document.toggle_class(button, markers::ACTIVE_CLASS);
    let open = document.toggle_class(menu, markers::ACTIVE_CLASS);
    document.set_scroll_locked(open);
}

fn close_mobile_menu(document: &mut Document) {
    let Some((menu, button)) = mobile_menu(document) else {
        return;
    };
    if document.has_class(menu, markers::ACTIVE_CLASS) {
        document.remove_class(menu, markers::ACTIVE_CLASS);
        document.remove_class(button, markers::ACTIVE_CLASS);
        document.set_scroll_locked(false);
    }
}
