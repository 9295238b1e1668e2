//! Gallery records held in the in-memory catalog
//!
//! A [`Gallery`] is created by a discovery worker, receives a thumbnail
//! handle once the thumbnail task has produced one, and may have its tags and
//! rating replaced by a metadata refresh. Galleries are identified by a
//! process-unique [`GalleryId`] rather than by any of their fields, so two
//! galleries with the same title are still distinct entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GALLERY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GalleryId(u64);

impl GalleryId {
    /// Allocate a fresh identifier
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_GALLERY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GalleryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a generated thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailHandle(String);

impl ThumbnailHandle {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThumbnailHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    #[serde(skip, default = "GalleryId::next")]
    id: GalleryId,

    /// Display title
    pub title: String,

    /// Tags in the order the source reported them
    #[serde(default)]
    pub tags: Vec<String>,

    /// Decimal rating kept as text; `None` or empty when unrated
    #[serde(default)]
    pub rating: Option<String>,

    #[serde(skip)]
    thumbnail: Option<ThumbnailHandle>,
}

impl Gallery {
    /// Create a gallery with a fresh identity and no thumbnail
    #[must_use]
    pub fn new(title: impl Into<String>, tags: Vec<String>, rating: Option<String>) -> Self {
        Self {
            id: GalleryId::next(),
            title: title.into(),
            tags,
            rating,
            thumbnail: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> GalleryId {
        self.id
    }

    /// Rating as text, treating an empty string as unrated
    #[must_use]
    pub fn rating_text(&self) -> Option<&str> {
        self.rating
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Numeric rating, if present and parseable
    #[must_use]
    pub fn rating_value(&self) -> Option<f64> {
        self.rating_text().and_then(|r| r.parse::<f64>().ok())
    }

    #[must_use]
    pub const fn thumbnail(&self) -> Option<&ThumbnailHandle> {
        self.thumbnail.as_ref()
    }

    #[must_use]
    pub const fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    pub fn attach_thumbnail(&mut self, handle: ThumbnailHandle) {
        self.thumbnail = Some(handle);
    }

    /// Replace tags and/or rating with refreshed values
    pub fn apply_update(&mut self, update: &MetadataUpdate) {
        if let Some(tags) = &update.tags {
            self.tags.clone_from(tags);
        }
        if let Some(rating) = &update.rating {
            self.rating = Some(rating.clone());
        }
    }
}

/// Refreshed metadata for one gallery, produced by a metadata worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub id: GalleryId,
    pub tags: Option<Vec<String>>,
    pub rating: Option<String>,
}

impl MetadataUpdate {
    #[must_use]
    pub const fn new(id: GalleryId) -> Self {
        Self {
            id,
            tags: None,
            rating: None,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }
}
