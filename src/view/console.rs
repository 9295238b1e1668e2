//! Line-oriented view for the command line
//!
//! Keeps the rows currently on screen, so hiding a gallery drops its row and
//! re-rendering one replaces it in place. The rows are written out with
//! [`ConsoleView::print_rows`] once the controller is idle. Control locks
//! only show up in the log.

use super::traits::{ControlSet, GalleryView};
use crate::config::Settings;
use crate::gallery::{Gallery, GalleryId};
use colored::Colorize;
use std::io::{self, Write};
use tracing::trace;

/// Stdout-backed [`GalleryView`]
#[derive(Debug, Default)]
pub struct ConsoleView {
    search_text: String,
    selected_page: usize,
    page_count: usize,
    quiet: bool,
    settings: Option<Settings>,
    rows: Vec<(GalleryId, String)>,
}

impl ConsoleView {
    #[must_use]
    pub fn new(search_text: impl Into<String>, selected_page: usize) -> Self {
        Self {
            search_text: search_text.into(),
            selected_page,
            ..Self::default()
        }
    }

    /// Suppress progress and page summaries
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_selected_page(&mut self, index: usize) {
        self.selected_page = index;
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Rows currently shown, in the order they were first rendered
    #[must_use]
    pub fn rows(&self) -> Vec<&str> {
        self.rows.iter().map(|(_, row)| row.as_str()).collect()
    }

    /// Write the visible rows to `out`, followed by a page summary
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing to `out` fails.
    pub fn print_rows(&self, out: &mut impl Write) -> io::Result<()> {
        for (_, row) in &self.rows {
            writeln!(out, "{row}")?;
        }
        if !self.quiet {
            let summary = format!(
                "page {}/{} ({} shown)",
                self.selected_page.min(self.page_count.saturating_sub(1)) + 1,
                self.page_count.max(1),
                self.rows.len()
            );
            writeln!(out, "{}", summary.dimmed())?;
        }
        Ok(())
    }

    fn format_row(gallery: &Gallery) -> String {
        let thumb = gallery
            .thumbnail()
            .map_or_else(|| "[..]".to_string(), |t| format!("[{t}]"));
        let rating = gallery
            .rating_text()
            .map_or_else(|| "-".dimmed().to_string(), |r| r.yellow().to_string());
        let tags = if gallery.tags.is_empty() {
            String::new()
        } else {
            gallery.tags.join(", ").dimmed().to_string()
        };
        format!("{} {} ({rating}) {tags}", thumb.cyan(), gallery.title.bold())
    }
}

impl GalleryView for ConsoleView {
    fn render_galleries(&mut self, galleries: &[&Gallery]) {
        for gallery in galleries {
            let row = Self::format_row(gallery);
            match self.rows.iter_mut().find(|(id, _)| *id == gallery.id()) {
                Some(existing) => existing.1 = row,
                None => self.rows.push((gallery.id(), row)),
            }
        }
    }

    fn hide_galleries(&mut self, galleries: &[&Gallery]) {
        trace!(count = galleries.len(), "hide galleries");
        self.rows
            .retain(|(id, _)| !galleries.iter().any(|g| g.id() == *id));
    }

    fn disable_controls(&mut self, controls: &ControlSet) {
        trace!(?controls, "controls disabled");
    }

    fn enable_controls(&mut self, controls: &ControlSet) {
        trace!(?controls, "controls enabled");
    }

    fn set_progress(&mut self, percent: u8) {
        if !self.quiet {
            eprint!("\r{} {percent:>3}%", "working".dimmed());
        }
    }

    fn clear_progress(&mut self) {
        if !self.quiet {
            eprint!("\r{:12}\r", "");
        }
    }

    fn search_text(&self) -> String {
        self.search_text.clone()
    }

    fn selected_page(&self) -> usize {
        self.selected_page
    }

    fn configure_page_choices(&mut self, page_count: usize) {
        self.page_count = page_count;
    }

    fn show_settings(&mut self, settings: &Settings) {
        self.settings = Some(settings.clone());
    }

    fn edited_settings(&self) -> Option<Settings> {
        self.settings.clone()
    }
}
