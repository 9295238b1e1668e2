//! Integration tests for the sadpanda controller
//!
//! These tests drive a `LibraryController` end to end with real manifest
//! files and settings stored in temporary directories.

use sadpanda::config::{ConfigStore, FileConfigStore, MemoryConfigStore, Settings};
use sadpanda::tasks::{TaskContext, TaskError, TaskSlot};
use sadpanda::view::{Control, ControlSet, RecordingView, ViewEvent};
use sadpanda::workers::{InitialsThumbnailer, MANIFEST_FILE, ManifestDiscovery, WorkerError};
use sadpanda::{Gallery, GalleryId, LibraryController, ThumbnailHandle, Workers};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

const CATALOG: &str = r#"[
    {"title": "Sea of Love", "tags": ["romance", "drama"], "rating": "4.2"},
    {"title": "War Zone", "tags": ["action"], "rating": "2.0"},
    {"title": "Quiet Harbor", "tags": ["drama", "slice of life"]}
]"#;

fn write_manifest(dir: &Path, json: &str) {
    fs::write(dir.join(MANIFEST_FILE), json).unwrap();
}

/// Controller over a single manifest directory with settings on disk
fn manifest_controller(gallery_dir: &Path, config_dir: &Path) -> LibraryController<RecordingView> {
    let mut settings = Settings::default();
    settings.add_dir(gallery_dir.to_path_buf());
    let mut store = FileConfigStore::new(config_dir.join("config.toml"));
    store.save(&settings).unwrap();

    let manifests = ManifestDiscovery::new(settings.dirs);
    let workers = Workers::new(manifests.clone(), InitialsThumbnailer, manifests);
    LibraryController::new(RecordingView::new(), store, workers)
}

fn page_titles(controller: &LibraryController<RecordingView>) -> Vec<String> {
    controller
        .current_page()
        .iter()
        .map(|g| g.title.clone())
        .collect()
}

fn search(controller: &mut LibraryController<RecordingView>, text: &str) -> Vec<String> {
    controller.view_mut().search_text = text.to_string();
    controller.search().unwrap();
    controller.run_until_idle(WAIT).unwrap();
    page_titles(controller)
}

#[test]
fn test_browse_manifest_catalog() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_manifest(galleries.path(), CATALOG);

    let mut controller = manifest_controller(galleries.path(), config.path());
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();

    assert_eq!(controller.dirs(), &[galleries.path().to_path_buf()]);
    assert_eq!(
        page_titles(&controller),
        vec!["Sea of Love", "War Zone", "Quiet Harbor"]
    );
    assert!(controller.galleries().iter().all(Gallery::has_thumbnail));
    assert_eq!(
        controller.galleries()[0].thumbnail(),
        Some(&ThumbnailHandle::new("SoL"))
    );
}

#[test]
fn test_query_language_end_to_end() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_manifest(galleries.path(), CATALOG);

    let mut controller = manifest_controller(galleries.path(), config.path());
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();

    assert_eq!(search(&mut controller, "love"), vec!["Sea of Love"]);
    assert_eq!(search(&mut controller, "drama"), vec!["Sea of Love", "Quiet Harbor"]);
    assert_eq!(search(&mut controller, "drama -romance"), vec!["Quiet Harbor"]);
    assert_eq!(search(&mut controller, "\"slice of life\""), vec!["Quiet Harbor"]);
    assert_eq!(search(&mut controller, "\"war zone\""), vec!["War Zone"]);
    assert_eq!(search(&mut controller, "rating:>=3"), vec!["Sea of Love"]);
    assert_eq!(search(&mut controller, "rating:<3"), vec!["War Zone"]);
    assert_eq!(search(&mut controller, "rating:=2"), vec!["War Zone"]);
    assert!(search(&mut controller, "nothing-like-this").is_empty());
    assert_eq!(controller.page_count(), 1);
    assert_eq!(
        search(&mut controller, ""),
        vec!["Sea of Love", "War Zone", "Quiet Harbor"]
    );
}

#[test]
fn test_paging_through_results() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let entries: Vec<String> = (0..7)
        .map(|i| format!(r#"{{"title": "Volume {i}", "tags": ["series"]}}"#))
        .collect();
    write_manifest(galleries.path(), &format!("[{}]", entries.join(",")));

    let mut controller = manifest_controller(galleries.path(), config.path()).with_page_size(3);
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();
    assert_eq!(controller.page_count(), 3);
    assert_eq!(controller.view().page_choices(), Some(3));

    controller.view_mut().selected_page = 2;
    controller.switch_page().unwrap();
    controller.run_until_idle(WAIT).unwrap();
    assert_eq!(page_titles(&controller), vec!["Volume 6"]);

    // Shrinking the result set pulls the page index back
    assert_eq!(search(&mut controller, "volume"), vec!["Volume 6"]);
    assert_eq!(search(&mut controller, "3"), vec!["Volume 3"]);
    assert_eq!(controller.current_page_index(), 0);

    // Out of range selection clamps to the last page
    search(&mut controller, "");
    controller.view_mut().selected_page = 10;
    controller.switch_page().unwrap();
    assert_eq!(controller.current_page_index(), 2);
    controller.run_until_idle(WAIT).unwrap();
}

#[test]
fn test_refresh_picks_up_manifest_changes() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_manifest(galleries.path(), CATALOG);

    let mut controller = manifest_controller(galleries.path(), config.path());
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();

    write_manifest(
        galleries.path(),
        r#"[{"title": "War Zone", "tags": ["action", "thriller"], "rating": "3.5"}]"#,
    );
    controller.view_mut().clear();
    controller.refresh_metadata(None).unwrap();
    assert_eq!(
        controller.view().events[0],
        ViewEvent::Disabled(ControlSet::only(&[
            Control::Refresh,
            Control::Submit,
            Control::Cancel
        ]))
    );
    controller.run_until_idle(WAIT).unwrap();

    let war = &controller.galleries()[1];
    assert_eq!(war.tags, vec!["action", "thriller"]);
    assert_eq!(war.rating_value(), Some(3.5));
    assert_eq!(controller.galleries()[0].rating.as_deref(), Some("4.2"));
    assert_eq!(search(&mut controller, "thriller rating:>3"), vec!["War Zone"]);
}

#[test]
fn test_remove_then_search_repaginates() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_manifest(galleries.path(), CATALOG);

    let mut controller = manifest_controller(galleries.path(), config.path());
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();

    let sea = controller.galleries()[0].id();
    controller.view_mut().clear();
    let removed = controller.remove_galleries(&[sea]);
    assert_eq!(removed[0].title, "Sea of Love");
    assert_eq!(controller.view().hidden_titles(), vec!["Sea of Love"]);

    assert_eq!(search(&mut controller, "drama"), vec!["Quiet Harbor"]);
}

#[test]
fn test_settings_round_trip_through_controller() {
    let galleries = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    write_manifest(galleries.path(), "[]");

    let mut controller = manifest_controller(galleries.path(), config.path());
    controller.start().unwrap();
    controller.run_until_idle(WAIT).unwrap();
    assert!(matches!(
        controller.view().events.first(),
        Some(ViewEvent::SettingsShown(s)) if s.dirs.len() == 1
    ));

    let mut edited = controller.settings().clone();
    edited.set_cookies("12345", "deadbeef");
    controller.update_settings(Some(edited)).unwrap();

    let stored = FileConfigStore::new(config.path().join("config.toml"))
        .load()
        .unwrap();
    assert_eq!(stored.cookies.ipb_member_id, "12345");
    assert_eq!(stored.dirs, vec![galleries.path().to_path_buf()]);
}

#[test]
fn test_thumbnail_requests_queue_while_busy() {
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let gate_rx = Mutex::new(gate_rx);
    let catalog: Vec<Gallery> = (0..4)
        .map(|i| Gallery::new(format!("Item {i}"), vec![], None))
        .collect();

    let workers = Workers::new(
        move |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> { Ok(catalog.clone()) },
        move |batch: &[Gallery], ctx: &TaskContext| -> Result<Vec<(GalleryId, ThumbnailHandle)>, WorkerError> {
            // Hold the first batch until the test releases it
            let _ = gate_rx.lock().map(|rx| rx.recv());
            ctx.check_cancelled()?;
            Ok(batch
                .iter()
                .map(|g| (g.id(), ThumbnailHandle::new(g.title.clone())))
                .collect())
        },
        |_batch: &[Gallery], _ctx: &TaskContext| -> Result<Vec<sadpanda::MetadataUpdate>, WorkerError> {
            Ok(Vec::new())
        },
    );
    let mut controller =
        LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers)
            .with_page_size(2);

    controller.start().unwrap();
    while !controller.is_busy(TaskSlot::Thumbnail) {
        controller.process_events().unwrap();
        std::thread::sleep(Duration::from_millis(5));
    }

    // Page 1 is requested while page 0 thumbnails are still being made
    controller.view_mut().selected_page = 1;
    controller.switch_page().unwrap();
    assert!(controller.is_busy(TaskSlot::Thumbnail));

    drop(gate_tx);
    controller.run_until_idle(WAIT).unwrap();

    let with_thumbs: Vec<&str> = controller
        .galleries()
        .iter()
        .filter(|g| g.has_thumbnail())
        .map(|g| g.title.as_str())
        .collect();
    assert_eq!(with_thumbs, vec!["Item 0", "Item 1", "Item 2", "Item 3"]);
    assert_eq!(
        controller.view().rendered_titles().last().map(String::as_str),
        Some("Item 3")
    );
}

#[test]
fn test_run_until_idle_times_out_and_shutdown_abandons() {
    let (hold_tx, hold_rx) = mpsc::channel::<()>();
    let hold_rx = Mutex::new(hold_rx);
    let workers = Workers::new(
        move |_ctx: &TaskContext| -> Result<Vec<Gallery>, WorkerError> {
            let _ = hold_rx.lock().map(|rx| rx.recv());
            Ok(Vec::new())
        },
        InitialsThumbnailer,
        |_batch: &[Gallery], _ctx: &TaskContext| -> Result<Vec<sadpanda::MetadataUpdate>, WorkerError> {
            Ok(Vec::new())
        },
    );
    let mut controller =
        LibraryController::new(RecordingView::new(), MemoryConfigStore::default(), workers);
    controller.start().unwrap();

    let err = controller
        .run_until_idle(Duration::from_millis(50))
        .unwrap_err();
    assert!(matches!(err, TaskError::Timeout { ref slots, .. } if slots == &[TaskSlot::Discovery]));

    let report = controller.shutdown(Duration::from_millis(50));
    assert_eq!(report.abandoned, vec![TaskSlot::Discovery]);
    assert!(!controller.is_busy(TaskSlot::Discovery));
    drop(hold_tx);
}
