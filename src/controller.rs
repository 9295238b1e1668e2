//! Library controller
//!
//! Owns the master gallery list, the active query, the page set and the task
//! registry, and reacts to view events and task completions. Everything here
//! runs on the coordinating thread; workers only ever receive clones.

use crate::SadpandaError;
use crate::config::{ConfigStore, Cookies, Settings};
use crate::gallery::{Gallery, GalleryId, MetadataUpdate, ThumbnailHandle};
use crate::pager::{PAGE_SIZE, Paginator};
use crate::query::{GalleryFilterExt, Query, parse};
use crate::tasks::{ShutdownReport, TaskError, TaskEvent, TaskOutput, TaskRegistry, TaskSlot};
use crate::view::GalleryView;
use crate::workers::{DiscoveryWorker, MetadataWorker, ThumbnailWorker};
use config::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The three background collaborators
#[derive(Clone)]
pub struct Workers {
    pub discovery: Arc<dyn DiscoveryWorker>,
    pub thumbnails: Arc<dyn ThumbnailWorker>,
    pub metadata: Arc<dyn MetadataWorker>,
}

impl Workers {
    pub fn new(
        discovery: impl DiscoveryWorker,
        thumbnails: impl ThumbnailWorker,
        metadata: impl MetadataWorker,
    ) -> Self {
        Self {
            discovery: Arc::new(discovery),
            thumbnails: Arc::new(thumbnails),
            metadata: Arc::new(metadata),
        }
    }
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workers").finish_non_exhaustive()
    }
}

/// Coordinates the catalog, the view and the background tasks
pub struct LibraryController<V: GalleryView> {
    view: V,
    store: Box<dyn ConfigStore>,
    settings: Settings,
    workers: Workers,
    galleries: Vec<Gallery>,
    query: Option<Query>,
    pager: Paginator<GalleryId>,
    tasks: TaskRegistry,
    pending_thumbnails: Vec<GalleryId>,
}

impl<V: GalleryView> LibraryController<V> {
    pub fn new(view: V, store: impl ConfigStore + 'static, workers: Workers) -> Self {
        Self {
            view,
            store: Box::new(store),
            settings: Settings::default(),
            workers,
            galleries: Vec::new(),
            query: None,
            pager: Paginator::new(PAGE_SIZE),
            tasks: TaskRegistry::new(),
            pending_thumbnails: Vec::new(),
        }
    }

    /// Use a page size other than [`PAGE_SIZE`]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pager = Paginator::new(page_size);
        self
    }

    /// Load settings into the view and kick off discovery
    ///
    /// # Errors
    ///
    /// Returns `SadpandaError` if settings cannot be loaded or discovery is
    /// already running.
    pub fn start(&mut self) -> Result<(), SadpandaError> {
        self.settings = self.store.load()?;
        self.view.show_settings(&self.settings);
        self.find_galleries()?;
        Ok(())
    }

    /// Start the discovery task
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if discovery is in flight.
    pub fn find_galleries(&mut self) -> Result<(), TaskError> {
        let worker = Arc::clone(&self.workers.discovery);
        self.tasks.start(TaskSlot::Discovery, &mut self.view, move |ctx| {
            worker.discover(ctx).map(TaskOutput::Discovered)
        })
    }

    /// Start a metadata refresh for `ids`, or for every gallery when `None`
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if a refresh is in flight.
    pub fn refresh_metadata(&mut self, ids: Option<&[GalleryId]>) -> Result<(), TaskError> {
        let snapshot: Vec<Gallery> = match ids {
            None => self.galleries.clone(),
            Some(ids) => {
                let wanted: HashSet<GalleryId> = ids.iter().copied().collect();
                self.galleries
                    .iter()
                    .filter(|g| wanted.contains(&g.id()))
                    .cloned()
                    .collect()
            }
        };
        info!(count = snapshot.len(), "refreshing metadata");

        let worker = Arc::clone(&self.workers.metadata);
        self.tasks.start(TaskSlot::Metadata, &mut self.view, move |ctx| {
            worker.refresh(&snapshot, ctx).map(TaskOutput::Metadata)
        })
    }

    /// Filter the catalog by the view's search text and show the result
    ///
    /// # Errors
    ///
    /// Returns `TaskError` if thumbnail generation for the new page cannot start.
    pub fn search(&mut self) -> Result<(), TaskError> {
        let search_text = self.view.search_text();
        self.hide_page();
        info!(search_text, "search");

        if search_text.trim().is_empty() {
            self.query = None;
            self.setup_pages(None);
        } else {
            let query = parse(&search_text);
            info!(words = ?query.words, filter_words = ?query.filter_words, "search terms");
            let ids: Vec<GalleryId> = self
                .galleries
                .matching(&query)
                .iter()
                .map(|g| g.id())
                .collect();
            self.query = Some(query);
            self.setup_pages(Some(ids));
        }
        self.show_page()
    }

    /// Move to the page selected in the view
    ///
    /// # Errors
    ///
    /// Returns `TaskError` if thumbnail generation for the new page cannot start.
    pub fn switch_page(&mut self) -> Result<(), TaskError> {
        self.hide_page();
        self.pager.select(self.view.selected_page());
        self.show_page()
    }

    /// Hide and drop galleries from the catalog
    ///
    /// Pages are not rebuilt; call [`search`](Self::search) afterwards to
    /// re-paginate. Returns the removed galleries.
    pub fn remove_galleries(&mut self, ids: &[GalleryId]) -> Vec<Gallery> {
        let doomed: HashSet<GalleryId> = ids.iter().copied().collect();
        let hidden: Vec<&Gallery> = self
            .galleries
            .iter()
            .filter(|g| doomed.contains(&g.id()))
            .collect();
        self.view.hide_galleries(&hidden);

        let (removed, kept): (Vec<Gallery>, Vec<Gallery>) = std::mem::take(&mut self.galleries)
            .into_iter()
            .partition(|g| doomed.contains(&g.id()));
        for gallery in &removed {
            debug!(title = %gallery.title, "removing gallery");
        }
        self.galleries = kept;
        self.pending_thumbnails.retain(|id| !doomed.contains(id));
        removed
    }

    /// Save settings, taking them from `settings` or else from the view
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store fails to save.
    pub fn update_settings(&mut self, settings: Option<Settings>) -> Result<(), ConfigError> {
        if let Some(new) = settings.or_else(|| self.view.edited_settings()) {
            debug!(dirs = ?new.dirs, "updating settings");
            self.settings = new;
        }
        self.store.save(&self.settings)
    }

    /// Apply every task event that is already waiting
    ///
    /// Returns the number of events handled.
    ///
    /// # Errors
    ///
    /// Returns `TaskError` if a completion handler cannot start follow-up work.
    pub fn process_events(&mut self) -> Result<usize, TaskError> {
        let mut handled = 0;
        while let Some(event) = self.tasks.try_next_event() {
            self.handle_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Handle task events until no task is running
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Timeout` if tasks are still running after `timeout`.
    pub fn run_until_idle(&mut self, timeout: Duration) -> Result<(), TaskError> {
        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            self.process_events()?;
            if !self.tasks.has_running() {
                return Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TaskError::Timeout {
                    elapsed: started.elapsed(),
                    slots: self.tasks.running_slots(),
                });
            }
            if let Some(event) = self.tasks.next_event(remaining) {
                self.handle_event(event)?;
            }
        }
    }

    /// Cancel running tasks, waiting up to `grace` for them to stop
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        self.pending_thumbnails.clear();
        let report = self.tasks.shutdown(grace);
        if !report.abandoned.is_empty() {
            warn!(abandoned = ?report.abandoned, "tasks did not stop in time");
        }
        report
    }

    fn handle_event(&mut self, event: TaskEvent) -> Result<(), TaskError> {
        if !self.tasks.is_current(&event) {
            let (slot, run) = event.origin();
            debug!(%slot, run, "ignoring event from a detached worker");
            return Ok(());
        }
        match event {
            TaskEvent::Progress { percent, .. } => {
                self.view.set_progress(percent);
                Ok(())
            }
            TaskEvent::Finished { slot, result, .. } => {
                self.tasks.complete(slot, &mut self.view)?;
                match result {
                    Ok(TaskOutput::Discovered(found)) => self.galleries_found(found),
                    Ok(TaskOutput::Thumbnails(handles)) => self.thumbnails_generated(handles),
                    Ok(TaskOutput::Metadata(updates)) => {
                        self.metadata_refreshed(&updates);
                        Ok(())
                    }
                    Err(e) => {
                        warn!("{e}");
                        if slot == TaskSlot::Thumbnail {
                            self.start_pending_thumbnails()
                        } else {
                            Ok(())
                        }
                    }
                }
            }
        }
    }

    fn galleries_found(&mut self, found: Vec<Gallery>) -> Result<(), TaskError> {
        info!(count = found.len(), "galleries found");
        self.galleries.extend(found);
        self.query = None;
        self.setup_pages(None);
        self.show_page()
    }

    fn thumbnails_generated(
        &mut self,
        handles: Vec<(GalleryId, ThumbnailHandle)>,
    ) -> Result<(), TaskError> {
        let mut handles: HashMap<GalleryId, ThumbnailHandle> = handles.into_iter().collect();
        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();

        let mut ready = Vec::new();
        for gallery in &mut self.galleries {
            if let Some(handle) = handles.remove(&gallery.id()) {
                gallery.attach_thumbnail(handle);
                if on_page.contains(&gallery.id()) {
                    ready.push(gallery.id());
                }
            }
        }
        let ready: HashSet<GalleryId> = ready.into_iter().collect();
        let shown = resolve(&self.galleries, &ready);
        if !shown.is_empty() {
            self.view.render_galleries(&shown);
        }

        self.start_pending_thumbnails()
    }

    fn metadata_refreshed(&mut self, updates: &[MetadataUpdate]) {
        let updates: HashMap<GalleryId, &MetadataUpdate> =
            updates.iter().map(|u| (u.id, u)).collect();
        for gallery in &mut self.galleries {
            if let Some(update) = updates.get(&gallery.id()) {
                gallery.apply_update(update);
            }
        }
        info!(count = updates.len(), "metadata refreshed");

        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();
        let shown: Vec<&Gallery> = resolve(&self.galleries, &on_page)
            .into_iter()
            .filter(|g| g.has_thumbnail())
            .collect();
        if !shown.is_empty() {
            self.view.render_galleries(&shown);
        }
    }

    fn setup_pages(&mut self, ids: Option<Vec<GalleryId>>) {
        let ids = ids.unwrap_or_else(|| self.galleries.iter().map(Gallery::id).collect());
        self.pager.setup(&ids);
        self.view.configure_page_choices(self.pager.page_count());
    }

    /// Render the current page; galleries without thumbnails go to the
    /// thumbnail task and are rendered when it completes
    fn show_page(&mut self) -> Result<(), TaskError> {
        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();
        let (ready, missing): (Vec<&Gallery>, Vec<&Gallery>) = resolve(&self.galleries, &on_page)
            .into_iter()
            .partition(|g| g.has_thumbnail());
        let missing: Vec<GalleryId> = missing.iter().map(|g| g.id()).collect();

        if !ready.is_empty() {
            self.view.render_galleries(&ready);
        }
        self.generate_thumbnails(missing)
    }

    fn hide_page(&mut self) {
        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();
        let shown = resolve(&self.galleries, &on_page);
        if !shown.is_empty() {
            self.view.hide_galleries(&shown);
        }
    }

    fn generate_thumbnails(&mut self, ids: Vec<GalleryId>) -> Result<(), TaskError> {
        if ids.is_empty() {
            return Ok(());
        }
        if self.tasks.is_running(TaskSlot::Thumbnail) {
            debug!(count = ids.len(), "thumbnail task busy, queueing");
            for id in ids {
                if !self.pending_thumbnails.contains(&id) {
                    self.pending_thumbnails.push(id);
                }
            }
            return Ok(());
        }

        let wanted: HashSet<GalleryId> = ids.into_iter().collect();
        let snapshot: Vec<Gallery> = resolve(&self.galleries, &wanted)
            .into_iter()
            .cloned()
            .collect();
        let worker = Arc::clone(&self.workers.thumbnails);
        self.tasks.start(TaskSlot::Thumbnail, &mut self.view, move |ctx| {
            worker.generate(&snapshot, ctx).map(TaskOutput::Thumbnails)
        })
    }

    /// Start queued thumbnail work that still concerns the current page
    fn start_pending_thumbnails(&mut self) -> Result<(), TaskError> {
        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();
        let pending: HashSet<GalleryId> = std::mem::take(&mut self.pending_thumbnails)
            .into_iter()
            .filter(|id| on_page.contains(id))
            .collect();
        let ids: Vec<GalleryId> = resolve(&self.galleries, &pending)
            .into_iter()
            .filter(|g| !g.has_thumbnail())
            .map(Gallery::id)
            .collect();
        self.generate_thumbnails(ids)
    }

    #[must_use]
    pub fn galleries(&self) -> &[Gallery] {
        &self.galleries
    }

    #[must_use]
    pub fn gallery(&self, id: GalleryId) -> Option<&Gallery> {
        self.galleries.iter().find(|g| g.id() == id)
    }

    /// Galleries on the active page, in display order
    #[must_use]
    pub fn current_page(&self) -> Vec<&Gallery> {
        let on_page: HashSet<GalleryId> = self.pager.current_page().iter().copied().collect();
        resolve(&self.galleries, &on_page)
    }

    #[must_use]
    pub const fn current_page_index(&self) -> usize {
        self.pager.current_index()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pager.page_count()
    }

    /// Query behind the current pages; `None` when showing everything
    #[must_use]
    pub const fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn is_busy(&self, slot: TaskSlot) -> bool {
        self.tasks.is_running(slot)
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn cookies(&self) -> &Cookies {
        &self.settings.cookies
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.settings.dirs
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

/// Galleries whose ids are in `ids`, in catalog order
fn resolve<'a>(galleries: &'a [Gallery], ids: &HashSet<GalleryId>) -> Vec<&'a Gallery> {
    if ids.is_empty() {
        return Vec::new();
    }
    galleries.iter().filter(|g| ids.contains(&g.id())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::tasks::TaskContext;
    use crate::view::{ControlSet, RecordingView, ViewEvent};
    use crate::workers::{InitialsThumbnailer, WorkerError};

    const WAIT: Duration = Duration::from_secs(5);

    fn sample() -> Vec<Gallery> {
        vec![
            Gallery::new("Sea of Love", vec!["romance".into(), "drama".into()], Some("4.2".into())),
            Gallery::new("War Zone", vec!["action".into()], Some("2.0".into())),
        ]
    }

    fn numbered(count: usize) -> Vec<Gallery> {
        (0..count)
            .map(|i| Gallery::new(format!("Gallery {i}"), vec![], None))
            .collect()
    }

    fn no_updates(_: &[Gallery], _: &TaskContext) -> Result<Vec<MetadataUpdate>, WorkerError> {
        Ok(Vec::new())
    }

    fn controller(galleries: Vec<Gallery>) -> LibraryController<RecordingView> {
        let workers = Workers::new(
            move |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> {
                Ok(galleries.clone())
            },
            InitialsThumbnailer,
            no_updates,
        );
        LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers)
    }

    fn started(galleries: Vec<Gallery>) -> LibraryController<RecordingView> {
        let mut c = controller(galleries);
        c.start().unwrap();
        c.run_until_idle(WAIT).unwrap();
        c.view_mut().clear();
        c
    }

    fn page_titles(c: &LibraryController<RecordingView>) -> Vec<String> {
        c.current_page().iter().map(|g| g.title.clone()).collect()
    }

    #[test]
    fn test_start_disables_controls_before_discovery() {
        let mut c = controller(sample());
        c.start().unwrap();
        assert!(matches!(c.view().events[0], ViewEvent::SettingsShown(_)));
        assert_eq!(c.view().events[1], ViewEvent::Disabled(ControlSet::All));
        c.run_until_idle(WAIT).unwrap();
    }

    #[test]
    fn test_discovery_renders_first_page_with_thumbnails() {
        let mut c = controller(sample());
        c.start().unwrap();
        c.run_until_idle(WAIT).unwrap();

        assert_eq!(c.galleries().len(), 2);
        assert_eq!(c.view().page_choices(), Some(1));
        assert_eq!(c.view().rendered_titles(), vec!["Sea of Love", "War Zone"]);
        assert!(c.galleries().iter().all(Gallery::has_thumbnail));
    }

    #[test]
    fn test_thumbnailed_galleries_render_immediately() {
        let mut c = started(sample());
        c.switch_page().unwrap();

        // No thumbnail task needed the second time around
        assert!(!c.is_busy(TaskSlot::Thumbnail));
        assert_eq!(
            c.view().events,
            vec![
                ViewEvent::Hidden(vec!["Sea of Love".into(), "War Zone".into()]),
                ViewEvent::Rendered(vec!["Sea of Love".into(), "War Zone".into()]),
            ]
        );
    }

    #[test]
    fn test_search_filters_and_preserves_order() {
        let mut c = started(sample());
        c.view_mut().search_text = "love rating:>=4".into();
        c.search().unwrap();
        assert_eq!(page_titles(&c), vec!["Sea of Love"]);

        c.view_mut().search_text = "-action".into();
        c.search().unwrap();
        assert_eq!(page_titles(&c), vec!["Sea of Love"]);

        c.view_mut().search_text = "\"war zone\"".into();
        c.search().unwrap();
        assert_eq!(page_titles(&c), vec!["War Zone"]);

        c.view_mut().search_text = String::new();
        c.search().unwrap();
        assert_eq!(page_titles(&c), vec!["Sea of Love", "War Zone"]);
        assert!(c.query().is_none());
    }

    #[test]
    fn test_search_hides_before_showing() {
        let mut c = started(sample());
        c.view_mut().search_text = "war".into();
        c.search().unwrap();

        let events = &c.view().events;
        assert_eq!(
            events[0],
            ViewEvent::Hidden(vec!["Sea of Love".into(), "War Zone".into()])
        );
        assert_eq!(events[1], ViewEvent::PageChoices(1));
        assert_eq!(events[2], ViewEvent::Rendered(vec!["War Zone".into()]));
    }

    #[test]
    fn test_switch_page_hides_then_shows() {
        let mut c = started(numbered(5)).with_page_size(2);
        c.view_mut().search_text = String::new();
        c.search().unwrap();
        c.run_until_idle(WAIT).unwrap();
        c.view_mut().clear();

        c.view_mut().selected_page = 1;
        c.switch_page().unwrap();
        c.run_until_idle(WAIT).unwrap();

        assert_eq!(c.current_page_index(), 1);
        assert_eq!(c.view().hidden_titles(), vec!["Gallery 0", "Gallery 1"]);
        assert_eq!(c.view().rendered_titles(), vec!["Gallery 2", "Gallery 3"]);
        let hide = c.view().events.iter().position(|e| matches!(e, ViewEvent::Hidden(_)));
        let show = c.view().events.iter().position(|e| matches!(e, ViewEvent::Rendered(_)));
        assert!(hide < show);
    }

    #[test]
    fn test_page_index_clamped_when_search_shrinks_results() {
        let mut c = controller(numbered(5)).with_page_size(2);
        c.start().unwrap();
        c.run_until_idle(WAIT).unwrap();
        c.view_mut().selected_page = 2;
        c.switch_page().unwrap();
        c.run_until_idle(WAIT).unwrap();
        assert_eq!(c.current_page_index(), 2);

        c.view_mut().search_text = "gallery".into();
        c.search().unwrap();
        assert_eq!(c.current_page_index(), 2);

        c.view_mut().search_text = "1".into();
        c.search().unwrap();
        assert_eq!(c.page_count(), 1);
        assert_eq!(c.current_page_index(), 0);
        assert_eq!(page_titles(&c), vec!["Gallery 1"]);
        c.run_until_idle(WAIT).unwrap();
    }

    #[test]
    fn test_remove_galleries_hides_without_repaginating() {
        let mut c = started(sample());
        let war = c.galleries()[1].id();

        let removed = c.remove_galleries(&[war]);
        assert_eq!(removed.len(), 1);
        assert_eq!(c.galleries().len(), 1);
        assert_eq!(c.view().events, vec![ViewEvent::Hidden(vec!["War Zone".into()])]);
        assert!(c.gallery(war).is_none());
        assert_eq!(page_titles(&c), vec!["Sea of Love"]);
    }

    #[test]
    fn test_metadata_refresh_applies_updates() {
        let workers = Workers::new(
            |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> { Ok(sample()) },
            InitialsThumbnailer,
            |galleries: &[Gallery], _ctx: &TaskContext| -> Result<Vec<MetadataUpdate>, WorkerError> {
                Ok(galleries
                    .iter()
                    .map(|g| MetadataUpdate::new(g.id()).with_rating("5.0"))
                    .collect())
            },
        );
        let mut c = LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers);
        c.start().unwrap();
        c.run_until_idle(WAIT).unwrap();
        c.view_mut().clear();

        let sea = c.galleries()[0].id();
        c.refresh_metadata(Some(&[sea][..])).unwrap();
        assert!(c.is_busy(TaskSlot::Metadata));
        assert!(matches!(c.refresh_metadata(None), Err(TaskError::AlreadyRunning(TaskSlot::Metadata))));
        c.run_until_idle(WAIT).unwrap();

        assert_eq!(c.galleries()[0].rating.as_deref(), Some("5.0"));
        assert_eq!(c.galleries()[1].rating.as_deref(), Some("2.0"));
        assert!(c.view().events.contains(&ViewEvent::ProgressCleared));
        assert_eq!(c.view().rendered_titles(), vec!["Sea of Love", "War Zone"]);
    }

    #[test]
    fn test_failed_discovery_reenables_controls() {
        let workers = Workers::new(
            |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> {
                Err(WorkerError::Failed("no disk".into()))
            },
            InitialsThumbnailer,
            no_updates,
        );
        let mut c = LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers);
        c.start().unwrap();
        c.run_until_idle(WAIT).unwrap();

        assert!(c.galleries().is_empty());
        assert!(c.view().events.contains(&ViewEvent::Enabled(ControlSet::All)));
        assert!(!c.is_busy(TaskSlot::Discovery));
    }

    #[test]
    fn test_find_galleries_twice_is_rejected() {
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = std::sync::Mutex::new(release_rx);
        let workers = Workers::new(
            move |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> {
                let _ = release_rx.lock().map(|rx| rx.recv());
                Ok(Vec::new())
            },
            InitialsThumbnailer,
            no_updates,
        );
        let mut c = LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers);
        c.start().unwrap();

        assert!(matches!(
            c.find_galleries(),
            Err(TaskError::AlreadyRunning(TaskSlot::Discovery))
        ));

        drop(release_tx);
        c.run_until_idle(WAIT).unwrap();
        c.find_galleries().unwrap();
        c.run_until_idle(WAIT).unwrap();
    }

    #[test]
    fn test_detached_discovery_does_not_complete_restart() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Mutex, mpsc};

        let (first_tx, first_rx) = mpsc::channel::<()>();
        let (second_tx, second_rx) = mpsc::channel::<()>();
        let gates = [Mutex::new(first_rx), Mutex::new(second_rx)];
        let calls = AtomicUsize::new(0);
        let workers = Workers::new(
            move |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> {
                let call = calls.fetch_add(1, Ordering::SeqCst).min(1);
                let _ = gates[call].lock().map(|rx| rx.recv());
                let title = if call == 0 { "Stale" } else { "Fresh" };
                Ok(vec![Gallery::new(title, vec![], None)])
            },
            InitialsThumbnailer,
            no_updates,
        );
        let mut c = LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers);
        c.start().unwrap();
        let report = c.shutdown(Duration::from_millis(20));
        assert_eq!(report.abandoned, vec![TaskSlot::Discovery]);

        c.find_galleries().unwrap();
        drop(first_tx);
        let deadline = Instant::now() + WAIT;
        while c.process_events().unwrap() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(c.galleries().is_empty());
        assert!(c.is_busy(TaskSlot::Discovery));

        drop(second_tx);
        c.run_until_idle(WAIT).unwrap();
        let titles: Vec<&str> = c.galleries().iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Fresh"]);
    }

    #[test]
    fn test_update_settings_from_view() {
        let mut c = controller(Vec::new());
        let mut edited = Settings::default();
        edited.set_cookies("42", "hash");
        c.view_mut().edited_settings = Some(edited.clone());

        c.update_settings(None).unwrap();
        assert_eq!(c.settings(), &edited);
        assert!(c.cookies().is_complete());
    }
}
