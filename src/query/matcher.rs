//! Gallery matching against a parsed [`Query`]
//!
//! Rules are applied in order and the first one that decides wins:
//!
//! 1. a rating constraint rejects unrated galleries and failed comparisons
//! 2. any negated term found in a tag (substring) or the title (token) rejects
//! 3. the gallery is accepted when all words are tag substrings, when there
//!    are no words, or when all words are title tokens
//!
//! The three conditions of rule 3 are alternatives over the whole word list,
//! not a per-word fallback: `["drama", "love"]` against tags `["drama"]` and
//! title "Love" is rejected.

use super::types::Query;
use crate::gallery::Gallery;
use rayon::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W").expect("valid non-word regex"));

/// Normalized title and tag tokens of one gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryTokens {
    pub title: Vec<String>,
    pub tags: Vec<String>,
}

impl GalleryTokens {
    #[must_use]
    pub fn new(gallery: &Gallery) -> Self {
        let title = NON_WORD
            .replace_all(&gallery.title.to_lowercase(), " ")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let tags = gallery
            .tags
            .iter()
            .map(|t| t.to_lowercase().replace(' ', "_"))
            .collect();
        Self { title, tags }
    }

    /// Some tag contains `term` as a substring
    #[must_use]
    pub fn in_tags(&self, term: &str) -> bool {
        self.tags.iter().any(|tag| tag.contains(term))
    }

    /// `term` equals a single title token
    #[must_use]
    pub fn is_title_token(&self, term: &str) -> bool {
        self.title.iter().any(|token| token == term)
    }

    /// `term` equals a title token, or an underscore-joined run of
    /// consecutive title tokens for phrase terms like `war_zone`
    #[must_use]
    pub fn in_title(&self, term: &str) -> bool {
        if self.is_title_token(term) {
            return true;
        }
        let parts: Vec<&str> = term.split('_').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 || parts.len() > self.title.len() {
            return false;
        }
        self.title
            .windows(parts.len())
            .any(|window| window.iter().zip(&parts).all(|(token, part)| token == part))
    }
}

/// Whether `gallery` satisfies `query`
#[must_use]
pub fn matches(gallery: &Gallery, query: &Query) -> bool {
    if let Some(filter) = &query.rating {
        match gallery.rating_value() {
            Some(rating) if filter.accepts(rating) => {}
            _ => return false,
        }
    }

    let tokens = GalleryTokens::new(gallery);

    if query
        .filter_words
        .iter()
        .any(|w| tokens.in_tags(w) || tokens.is_title_token(w))
    {
        return false;
    }

    query.words.iter().all(|w| tokens.in_tags(w))
        || query.words.is_empty()
        || query.words.iter().all(|w| tokens.in_title(w))
}

/// Extension trait for filtering gallery slices by a query
///
/// Matching runs in parallel; results keep the input order.
pub trait GalleryFilterExt {
    /// Galleries matching `query`, in catalog order
    fn matching<'a>(&'a self, query: &Query) -> Vec<&'a Gallery>;
}

impl GalleryFilterExt for [Gallery] {
    fn matching<'a>(&'a self, query: &Query) -> Vec<&'a Gallery> {
        if query.is_empty() {
            return self.iter().collect();
        }
        self.par_iter().filter(|g| matches(g, query)).collect()
    }
}
