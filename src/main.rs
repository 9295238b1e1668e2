//! Sadpanda CLI application entry point
//!
//! Runs the library controller against a [`ConsoleView`], using gallery
//! manifests in the watched directories as the catalog source.
//!
//! # Usage
//!
//! ```bash
//! # Watch a directory containing a catalog.json manifest
//! sadpanda config add-dir ~/galleries
//!
//! # Print the first page of everything (default command)
//! sadpanda
//!
//! # Search, then show the second page of results
//! sadpanda browse -p 2 romance "rating:>=4"
//!
//! # Negated terms go after `--`
//! sadpanda browse -- romance -action
//!
//! # Re-read metadata for the shown page
//! sadpanda refresh romance
//! ```
//!
//! # Configuration
//!
//! Settings are stored in the user's config directory
//! (`~/.config/sadpanda/config.toml` on Linux) unless `--config` is given.

use sadpanda::{
    GalleryId, LibraryController, SadpandaError, Workers,
    cli::{Cli, Commands, ConfigCommands},
    config::{ConfigStore, FileConfigStore},
    logging::{self, LogConfig},
    view::ConsoleView,
    workers::{InitialsThumbnailer, ManifestDiscovery},
};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

type Result<T> = std::result::Result<T, SadpandaError>;

/// Upper bound on waiting for background work before giving up
const TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// How long cancelled workers get to stop on exit
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Handle the browse and refresh commands
///
/// Discovers galleries, applies the query and page selection, optionally
/// refreshes metadata for the selected page and prints it.
///
/// # Errors
///
/// Returns `SadpandaError` if settings cannot be loaded, a task fails to
/// start or does not finish in time, or stdout cannot be written.
fn handle_list_command(store: FileConfigStore, command: &Commands, quiet: bool) -> Result<()> {
    let settings = store.load()?;
    if settings.dirs.is_empty() && !quiet {
        eprintln!("No directories configured. Use 'sadpanda config add-dir <DIR>' to add one.");
    }

    let manifests = ManifestDiscovery::new(settings.dirs);
    let workers = Workers::new(manifests.clone(), InitialsThumbnailer, manifests);
    let view = ConsoleView::new(command.search_text(), command.page_index()).with_quiet(quiet);
    let mut controller = LibraryController::new(view, store, workers);

    controller.start()?;
    controller.run_until_idle(TASK_TIMEOUT)?;

    if !command.search_text().trim().is_empty() {
        controller.search()?;
    }
    if command.page_index() > 0 {
        controller.switch_page()?;
    }
    controller.run_until_idle(TASK_TIMEOUT)?;

    if matches!(command, Commands::Refresh { .. }) {
        let ids: Vec<GalleryId> = controller.current_page().iter().map(|g| g.id()).collect();
        controller.refresh_metadata(Some(ids.as_slice()))?;
        controller.run_until_idle(TASK_TIMEOUT)?;
    }

    controller.view().print_rows(&mut io::stdout().lock())?;

    let report = controller.shutdown(SHUTDOWN_GRACE);
    if !report.abandoned.is_empty() {
        warn!(abandoned = ?report.abandoned, "exiting with workers still running");
    }
    Ok(())
}

/// Handle the config command - show or edit stored settings
///
/// # Errors
///
/// Returns `SadpandaError` if settings cannot be loaded or saved, or a
/// directory argument is invalid.
fn handle_config_command(
    mut store: FileConfigStore,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    let mut settings = store.load()?;

    match command {
        ConfigCommands::Show => {
            println!("Config file: {}", store.path().display());
            println!("ipb_member_id: {}", display_secret(&settings.cookies.ipb_member_id));
            println!("ipb_pass_hash: {}", display_secret(&settings.cookies.ipb_pass_hash));
            if settings.dirs.is_empty() {
                println!("Directories: (none)");
            } else {
                println!("Directories:");
                for dir in &settings.dirs {
                    println!("  - {}", dir.display());
                }
            }
            return Ok(());
        }
        ConfigCommands::SetCookies {
            member_id,
            pass_hash,
        } => {
            settings.set_cookies(member_id.trim(), pass_hash.trim());
            store.save(&settings)?;
            if !quiet {
                println!("Cookies saved");
            }
        }
        ConfigCommands::AddDir { path } => {
            let fullpath = path.canonicalize().map_err(|e| {
                SadpandaError::InvalidInput(format!("Cannot access path '{}': {e}", path.display()))
            })?;
            if !fullpath.is_dir() {
                return Err(SadpandaError::InvalidInput(format!(
                    "'{}' is not a directory",
                    path.display()
                )));
            }
            if settings.add_dir(fullpath.clone()) {
                store.save(&settings)?;
                if !quiet {
                    println!("Watching {}", fullpath.display());
                }
            } else if !quiet {
                println!("Already watching {}", fullpath.display());
            }
        }
        ConfigCommands::RemoveDir { path } => {
            if !remove_dir(&mut settings, path) {
                return Err(SadpandaError::InvalidInput(format!(
                    "'{}' is not a watched directory",
                    path.display()
                )));
            }
            store.save(&settings)?;
            if !quiet {
                println!("Stopped watching {}", path.display());
            }
        }
    }
    Ok(())
}

/// Remove `path` as given, or in canonical form if that was what got stored
fn remove_dir(settings: &mut sadpanda::config::Settings, path: &Path) -> bool {
    settings.remove_dir(path)
        || path
            .canonicalize()
            .is_ok_and(|canonical| settings.remove_dir(&canonical))
}

fn display_secret(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}

/// Main entry point for the sadpanda application
///
/// # Errors
///
/// Returns `SadpandaError` if the selected command fails.
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let log_config = LogConfig {
        verbose: cli.verbose,
        quiet: cli.quiet,
        log_dir: None,
    };
    match logging::init_logging(&log_config) {
        Ok(path) => info!(log = %path.display(), "sadpanda starting"),
        Err(e) => eprintln!("Logging disabled: {e}"),
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::new(path),
        None => FileConfigStore::at_default_path()?,
    };

    let command = cli.get_command();
    match &command {
        Commands::Config { command } => handle_config_command(store, command, cli.quiet),
        Commands::Browse { .. } | Commands::Refresh { .. } => {
            handle_list_command(store, &command, cli.quiet)
        }
    }
}
