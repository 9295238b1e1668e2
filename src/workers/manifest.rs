//! Manifest-backed discovery and metadata
//!
//! Each watched directory may hold a `catalog.json` listing its galleries:
//!
//! ```json
//! [
//!   { "title": "Sea of Love", "tags": ["romance", "drama"], "rating": "4.2" },
//!   { "title": "War Zone", "tags": ["action"] }
//! ]
//! ```
//!
//! Directories without a manifest are skipped. A broken manifest is logged
//! and skipped so one bad directory does not hide the others.

use super::error::WorkerError;
use super::{DiscoveryWorker, MetadataWorker};
use crate::gallery::{Gallery, MetadataUpdate};
use crate::tasks::TaskContext;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the per-directory gallery manifest
pub const MANIFEST_FILE: &str = "catalog.json";

/// Reads gallery manifests from a list of directories
#[derive(Debug, Clone, Default)]
pub struct ManifestDiscovery {
    dirs: Vec<PathBuf>,
}

impl ManifestDiscovery {
    #[must_use]
    pub const fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Parse one manifest file
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Io` if the file cannot be read, or
    /// `WorkerError::Manifest` if it is not a valid gallery list.
    pub fn read_manifest(path: &Path) -> Result<Vec<Gallery>, WorkerError> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|source| WorkerError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All galleries from all readable manifests, in directory order
    fn collect(&self, ctx: &TaskContext) -> Result<Vec<Gallery>, WorkerError> {
        let mut galleries = Vec::new();
        for (i, dir) in self.dirs.iter().enumerate() {
            ctx.check_cancelled()?;

            let path = dir.join(MANIFEST_FILE);
            if !path.is_file() {
                debug!(dir = %dir.display(), "no manifest, skipping");
            } else {
                match Self::read_manifest(&path) {
                    Ok(found) => {
                        debug!(dir = %dir.display(), count = found.len(), "manifest read");
                        galleries.extend(found);
                    }
                    Err(e) => warn!("Skipping {}: {e}", dir.display()),
                }
            }

            ctx.report_progress(i + 1, self.dirs.len());
        }
        Ok(galleries)
    }
}

impl DiscoveryWorker for ManifestDiscovery {
    fn discover(&self, ctx: &TaskContext) -> Result<Vec<Gallery>, WorkerError> {
        self.collect(ctx)
    }
}

impl MetadataWorker for ManifestDiscovery {
    /// Re-read the manifests and report galleries whose tags or rating changed
    ///
    /// Galleries are matched by case-insensitive title; the first manifest
    /// entry with a given title wins.
    fn refresh(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<MetadataUpdate>, WorkerError> {
        let mut latest: HashMap<String, Gallery> = HashMap::new();
        for gallery in self.collect(ctx)? {
            latest.entry(gallery.title.to_lowercase()).or_insert(gallery);
        }

        let mut updates = Vec::new();
        for (i, gallery) in galleries.iter().enumerate() {
            ctx.check_cancelled()?;

            if let Some(fresh) = latest.get(&gallery.title.to_lowercase()) {
                let mut update = MetadataUpdate::new(gallery.id());
                if fresh.tags != gallery.tags {
                    update = update.with_tags(fresh.tags.clone());
                }
                if fresh.rating != gallery.rating {
                    if let Some(rating) = &fresh.rating {
                        update = update.with_rating(rating.clone());
                    }
                }
                if update.tags.is_some() || update.rating.is_some() {
                    updates.push(update);
                }
            }

            ctx.report_progress(i + 1, galleries.len());
        }
        Ok(updates)
    }
}
