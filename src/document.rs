//! In-memory page model the i18n engine operates on.
//!
//! Elements live in an arena and refer to their parent by index, which is
//! enough for the queries the translator and controller need: attribute and
//! class selection, `closest` ancestor lookup and next-sibling lookup.

use std::collections::{BTreeMap, BTreeSet};

/// Attribute and class names the site's markup uses.
pub mod markers {
    /// Attribute holding an element's translation key.
    pub const TRANSLATE_ATTR: &str = "data-translate";
    /// Attribute holding a language option's target language.
    pub const LANG_ATTR: &str = "data-lang";

    pub const CURRENT_LANG_CLASS: &str = "current-lang";
    pub const LANGUAGE_OPTION_CLASS: &str = "language-option";
    pub const LANGUAGE_BUTTON_CLASS: &str = "language-btn";
    pub const LANGUAGE_DROPDOWN_CLASS: &str = "language-dropdown";
    pub const LANGUAGE_SELECTOR_CLASS: &str = "language-selector";
    pub const ACTIVE_CLASS: &str = "active";

    pub const MOBILE_MENU_ID: &str = "mobileMenu";
    pub const MOBILE_MENU_BUTTON_ID: &str = "mobileMenuBtn";
    pub const MOBILE_MENU_CLASS: &str = "mobile-menu";
}

/// Index of an element inside its `Document`.
pub type ElementId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    elements: Vec<Element>,
    scroll_locked: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element under `parent` (or at the top level) and return its id.
    pub fn append(&mut self, parent: Option<ElementId>, mut element: Element) -> ElementId {
        element.parent = parent.filter(|&p| p < self.elements.len());
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::text)
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(id) {
            element.text = text.into();
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.classes.remove(class);
        }
    }

    /// Toggle a class, returning whether it is now present.
    pub fn toggle_class(&mut self, id: ElementId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    /// Elements carrying `name`, with the attribute value, in document order.
    pub fn select_by_attr<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (ElementId, &'a str)> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter_map(move |(id, e)| e.attr(name).map(|value| (id, value)))
    }

    /// Ids of elements with `class`, in document order.
    pub fn select_by_class(&self, class: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.has_class(class))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn get_by_id(&self, element_id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.id() == Some(element_id))
    }

    /// The element itself or its nearest ancestor matching `pred`.
    pub fn closest(&self, id: ElementId, pred: impl Fn(&Element) -> bool) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(candidate) = current {
            let element = self.element(candidate)?;
            if pred(element) {
                return Some(candidate);
            }
            current = element.parent;
        }
        None
    }

    pub fn closest_with_class(&self, id: ElementId, class: &str) -> Option<ElementId> {
        self.closest(id, |e| e.has_class(class))
    }

    /// Next element sharing the same parent, in document order.
    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.element(id)?.parent;
        self.elements
            .iter()
            .enumerate()
            .skip(id + 1)
            .find(|(_, e)| e.parent == parent)
            .map(|(sibling, _)| sibling)
    }

    /// Whether page scrolling is disabled (mobile menu open).
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::markers::*;
    use super::*;

    fn selector_page() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::new();
        let selector = doc.append(None, Element::new("div").with_class(LANGUAGE_SELECTOR_CLASS));
        let button = doc.append(
            Some(selector),
            Element::new("button").with_class(LANGUAGE_BUTTON_CLASS),
        );
        let dropdown = doc.append(
            Some(selector),
            Element::new("div").with_class(LANGUAGE_DROPDOWN_CLASS),
        );
        (doc, selector, button, dropdown)
    }

    #[test]
    fn test_select_by_attr_in_document_order() {
        let mut doc = Document::new();
        doc.append(None, Element::new("h1").with_attr(TRANSLATE_ATTR, "hero.title"));
        doc.append(None, Element::new("p"));
        doc.append(None, Element::new("p").with_attr(TRANSLATE_ATTR, "hero.body"));

        let found: Vec<_> = doc.select_by_attr(TRANSLATE_ATTR).collect();
        assert_eq!(found, vec![(0, "hero.title"), (2, "hero.body")]);
    }

    #[test]
    fn test_closest_walks_ancestors() {
        let (mut doc, selector, _, dropdown) = selector_page();
        let option = doc.append(
            Some(dropdown),
            Element::new("a").with_class(LANGUAGE_OPTION_CLASS),
        );
        assert_eq!(doc.closest_with_class(option, LANGUAGE_SELECTOR_CLASS), Some(selector));
        assert_eq!(doc.closest_with_class(option, LANGUAGE_OPTION_CLASS), Some(option));
        assert_eq!(doc.closest_with_class(option, "missing"), None);
    }

    #[test]
    fn test_next_sibling_skips_children() {
        let (mut doc, _, button, dropdown) = selector_page();
        doc.append(Some(button), Element::new("span").with_class(CURRENT_LANG_CLASS));
        assert_eq!(doc.next_sibling(button), Some(dropdown));
        assert_eq!(doc.next_sibling(dropdown), None);
    }

    #[test]
    fn test_toggle_class() {
        let (mut doc, _, _, dropdown) = selector_page();
        assert!(doc.toggle_class(dropdown, ACTIVE_CLASS));
        assert!(doc.has_class(dropdown, ACTIVE_CLASS));
        assert!(!doc.toggle_class(dropdown, ACTIVE_CLASS));
        assert!(!doc.has_class(dropdown, ACTIVE_CLASS));
    }

    #[test]
    fn test_get_by_id() {
        let mut doc = Document::new();
        doc.append(None, Element::new("nav"));
        let menu = doc.append(None, Element::new("div").with_id(MOBILE_MENU_ID));
        assert_eq!(doc.get_by_id(MOBILE_MENU_ID), Some(menu));
        assert_eq!(doc.get_by_id(MOBILE_MENU_BUTTON_ID), None);
    }

    #[test]
    fn test_out_of_range_ids_are_ignored() {
        let mut doc = Document::new();
        doc.set_text(5, "ignored");
        doc.add_class(5, ACTIVE_CLASS);
        assert!(doc.is_empty());
        assert_eq!(doc.text(5), None);
    }
}
