//! Background worker contracts
//!
//! The controller does not know how galleries are found, how thumbnails are
//! made or where metadata comes from. It hands snapshots to these traits on a
//! worker thread and applies whatever comes back on the coordinating thread.
//!
//! Each trait is implemented for plain closures, so embedding code and tests
//! can pass `|ctx: &TaskContext| ...` directly. [`ManifestDiscovery`] and
//! [`InitialsThumbnailer`] are the simple implementations used by the CLI.

pub mod error;
pub mod manifest;
pub mod thumbnail;

pub use error::WorkerError;
pub use manifest::{MANIFEST_FILE, ManifestDiscovery};
pub use thumbnail::InitialsThumbnailer;

use crate::gallery::{Gallery, GalleryId, MetadataUpdate, ThumbnailHandle};
use crate::tasks::TaskContext;

/// Finds galleries to add to the catalog
pub trait DiscoveryWorker: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns `WorkerError` if discovery fails or is cancelled.
    fn discover(&self, ctx: &TaskContext) -> Result<Vec<Gallery>, WorkerError>;
}

/// Produces thumbnails for galleries that lack one
pub trait ThumbnailWorker: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns `WorkerError` if generation fails or is cancelled.
    fn generate(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<(GalleryId, ThumbnailHandle)>, WorkerError>;
}

/// Fetches fresh tags and ratings for existing galleries
pub trait MetadataWorker: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns `WorkerError` if the refresh fails or is cancelled.
    fn refresh(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<MetadataUpdate>, WorkerError>;
}

impl<F> DiscoveryWorker for F
where
    F: Fn(&TaskContext) -> Result<Vec<Gallery>, WorkerError> + Send + Sync + 'static,
{
    fn discover(&self, ctx: &TaskContext) -> Result<Vec<Gallery>, WorkerError> {
        self(ctx)
    }
}

impl<F> ThumbnailWorker for F
where
    F: Fn(&[Gallery], &TaskContext) -> Result<Vec<(GalleryId, ThumbnailHandle)>, WorkerError>
        + Send
        + Sync
        + 'static,
{
    fn generate(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<(GalleryId, ThumbnailHandle)>, WorkerError> {
        self(galleries, ctx)
    }
}

impl<F> MetadataWorker for F
where
    F: Fn(&[Gallery], &TaskContext) -> Result<Vec<MetadataUpdate>, WorkerError>
        + Send
        + Sync
        + 'static,
{
    fn refresh(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<MetadataUpdate>, WorkerError> {
        self(galleries, ctx)
    }
}
