//! Recording view for testing

use super::traits::{ControlSet, GalleryView};
use crate::config::Settings;
use crate::gallery::Gallery;

/// One call the controller made into the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Rendered(Vec<String>),
    Hidden(Vec<String>),
    Disabled(ControlSet),
    Enabled(ControlSet),
    Progress(u8),
    ProgressCleared,
    PageChoices(usize),
    SettingsShown(Settings),
}

/// View that records every call and returns predetermined input
///
/// Galleries are recorded by title so assertions stay readable.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    /// Text returned by `search_text`
    pub search_text: String,
    /// Index returned by `selected_page`
    pub selected_page: usize,
    /// Settings returned by `edited_settings`
    pub edited_settings: Option<Settings>,
    /// Every call, in order
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Forget recorded events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Titles of every render call, flattened in order
    #[must_use]
    pub fn rendered_titles(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Rendered(titles) => Some(titles.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Titles of every hide call, flattened in order
    #[must_use]
    pub fn hidden_titles(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Hidden(titles) => Some(titles.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Last page count offered to the user
    #[must_use]
    pub fn page_choices(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::PageChoices(n) => Some(*n),
            _ => None,
        })
    }
}

fn titles(galleries: &[&Gallery]) -> Vec<String> {
    galleries.iter().map(|g| g.title.clone()).collect()
}

impl GalleryView for RecordingView {
    fn render_galleries(&mut self, galleries: &[&Gallery]) {
        self.events.push(ViewEvent::Rendered(titles(galleries)));
    }

    fn hide_galleries(&mut self, galleries: &[&Gallery]) {
        self.events.push(ViewEvent::Hidden(titles(galleries)));
    }

    fn disable_controls(&mut self, controls: &ControlSet) {
        self.events.push(ViewEvent::Disabled(controls.clone()));
    }

    fn enable_controls(&mut self, controls: &ControlSet) {
        self.events.push(ViewEvent::Enabled(controls.clone()));
    }

    fn set_progress(&mut self, percent: u8) {
        self.events.push(ViewEvent::Progress(percent));
    }

    fn clear_progress(&mut self) {
        self.events.push(ViewEvent::ProgressCleared);
    }

    fn search_text(&self) -> String {
        self.search_text.clone()
    }

    fn selected_page(&self) -> usize {
        self.selected_page
    }

    fn configure_page_choices(&mut self, page_count: usize) {
        self.events.push(ViewEvent::PageChoices(page_count));
    }

    fn show_settings(&mut self, settings: &Settings) {
        self.events.push(ViewEvent::SettingsShown(settings.clone()));
    }

    fn edited_settings(&self) -> Option<Settings> {
        self.edited_settings.clone()
    }
}
