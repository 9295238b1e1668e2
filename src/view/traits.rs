//! Presentation-layer contract driven by the controller

use crate::config::Settings;
use crate::gallery::Gallery;
use std::fmt;

/// Interactive controls the controller can lock while work is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    Search,
    PageSelect,
    Refresh,
    Submit,
    Cancel,
    Remove,
    Settings,
}

impl Control {
    /// Every control, in display order
    pub const ALL: [Self; 7] = [
        Self::Search,
        Self::PageSelect,
        Self::Refresh,
        Self::Submit,
        Self::Cancel,
        Self::Remove,
        Self::Settings,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::PageSelect => "page-select",
            Self::Refresh => "refresh",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::Remove => "remove",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A group of controls to enable or disable together
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSet {
    All,
    Only(Vec<Control>),
}

impl ControlSet {
    /// Build a named subset
    #[must_use]
    pub fn only(controls: &[Control]) -> Self {
        let mut controls = controls.to_vec();
        controls.sort_unstable();
        controls.dedup();
        Self::Only(controls)
    }

    #[must_use]
    pub fn contains(&self, control: Control) -> bool {
        match self {
            Self::All => true,
            Self::Only(controls) => controls.contains(&control),
        }
    }

    /// Controls of `self` that are not in `other`; `None` when nothing is left
    #[must_use]
    pub fn without(&self, other: &Self) -> Option<Self> {
        if matches!(other, Self::All) {
            return None;
        }
        let remaining: Vec<Control> = match self {
            Self::All => Control::ALL.to_vec(),
            Self::Only(controls) => controls.clone(),
        }
        .into_iter()
        .filter(|c| !other.contains(*c))
        .collect();

        if remaining.is_empty() {
            None
        } else if matches!(self, Self::All) && remaining.len() == Control::ALL.len() {
            Some(Self::All)
        } else {
            Some(Self::Only(remaining))
        }
    }

    /// Union of two sets
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Only(a), Self::Only(b)) => {
                let merged: Vec<Control> = a.iter().chain(b).copied().collect();
                Self::only(&merged)
            }
        }
    }
}

/// Presentation collaborator
///
/// Implemented by whatever renders galleries. The controller only ever
/// calls into it from the coordinating thread.
pub trait GalleryView {
    /// Show the given galleries
    fn render_galleries(&mut self, galleries: &[&Gallery]);

    /// Hide the given galleries
    fn hide_galleries(&mut self, galleries: &[&Gallery]);

    fn disable_controls(&mut self, controls: &ControlSet);

    fn enable_controls(&mut self, controls: &ControlSet);

    /// Update the progress indicator (0-100)
    fn set_progress(&mut self, percent: u8);

    fn clear_progress(&mut self);

    /// Current contents of the search box
    fn search_text(&self) -> String;

    /// Page index the user picked
    fn selected_page(&self) -> usize;

    /// Offer `page_count` pages for selection
    fn configure_page_choices(&mut self, page_count: usize);

    /// Populate the settings pane
    fn show_settings(&mut self, settings: &Settings);

    /// Settings as edited by the user, if the view has a settings pane
    fn edited_settings(&self) -> Option<Settings>;
}
