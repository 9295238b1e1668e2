use super::ThumbnailWorker;
use super::error::WorkerError;
use crate::gallery::{Gallery, GalleryId, ThumbnailHandle};
use crate::tasks::TaskContext;

const MAX_INITIALS: usize = 4;

/// Text thumbnails made of a title's initials
///
/// Stands in for real image generation in the CLI, where a row of text is
/// all that can be shown anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialsThumbnailer;

impl InitialsThumbnailer {
    #[must_use]
    pub fn initials(title: &str) -> String {
        let initials: String = title
            .split(|c: char| !c.is_alphanumeric())
            .filter_map(|word| word.chars().next())
            .take(MAX_INITIALS)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}

impl ThumbnailWorker for InitialsThumbnailer {
    fn generate(
        &self,
        galleries: &[Gallery],
        ctx: &TaskContext,
    ) -> Result<Vec<(GalleryId, ThumbnailHandle)>, WorkerError> {
        let mut handles = Vec::with_capacity(galleries.len());
        for (i, gallery) in galleries.iter().enumerate() {
            ctx.check_cancelled()?;
            handles.push((gallery.id(), ThumbnailHandle::new(Self::initials(&gallery.title))));
            ctx.report_progress(i + 1, galleries.len());
        }
        Ok(handles)
    }
}
