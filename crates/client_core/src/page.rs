//! In-memory page model implementing [`UiPort`].

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use shared::{domain::Section, protocol::CALLSIGN_INPUT_ID};

use crate::UiPort;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    inputs: BTreeMap<String, String>,
    link_href: Option<String>,
    hidden: BTreeSet<Section>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            inputs: BTreeMap::new(),
            link_href: None,
            hidden: Section::ALL.into_iter().collect(),
        }
    }
}

impl PageState {
    /// A freshly loaded page: every section hidden, no link target.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callsign_input(mut self, value: impl Into<String>) -> Self {
        self.set_input(CALLSIGN_INPUT_ID, value);
        self
    }

    pub fn set_input(&mut self, id: &str, value: impl Into<String>) {
        self.inputs.insert(id.to_string(), value.into());
    }

    pub fn input(&self, id: &str) -> Option<&str> {
        self.inputs.get(id).map(String::as_str)
    }

    pub fn link_href(&self) -> Option<&str> {
        self.link_href.as_deref()
    }

    pub fn is_visible(&self, section: Section) -> bool {
        !self.hidden.contains(&section)
    }

    pub fn visible_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| self.is_visible(*section))
            .collect()
    }

    fn show(&mut self, section: Section, visible: bool) {
        if visible {
            self.hidden.remove(&section);
        } else {
            self.hidden.insert(section);
        }
    }
}

/// Cloneable handle to one [`PageState`].
#[derive(Debug, Clone, Default)]
pub struct SharedPage {
    state: Arc<Mutex<PageState>>,
}

impl SharedPage {
    pub fn new(state: PageState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn snapshot(&self) -> PageState {
        self.lock().clone()
    }

    pub fn set_input(&self, id: &str, value: impl Into<String>) {
        self.lock().set_input(id, value);
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UiPort for SharedPage {
    fn show(&self, section: Section, visible: bool) {
        self.lock().show(section, visible);
    }

    fn set_link_href(&self, href: &str) {
        self.lock().link_href = Some(href.to_string());
    }

    fn input_value(&self, id: &str) -> Option<String> {
        self.lock().input(id).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_page_hides_every_section() {
        let page = PageState::new();
        assert!(page.visible_sections().is_empty());
        assert_eq!(page.link_href(), None);
    }

    #[test]
    fn show_toggles_hidden_class() {
        let page = SharedPage::default();
        page.show(Section::Join, true);
        page.show(Section::Ready, true);
        assert_eq!(
            page.snapshot().visible_sections(),
            vec![Section::Ready, Section::Join]
        );

        page.show(Section::Ready, false);
        page.show(Section::Ready, false);
        assert_eq!(page.snapshot().visible_sections(), vec![Section::Join]);
    }

    #[test]
    fn reads_inputs_by_id() {
        let page = SharedPage::new(PageState::new().with_callsign_input("dl1abc"));
        assert_eq!(page.input_value("callsign").as_deref(), Some("dl1abc"));
        assert_eq!(page.input_value("missing"), None);

        page.set_input("callsign", "ok2xyz");
        assert_eq!(page.snapshot().input("callsign"), Some("ok2xyz"));
    }
}
