//! Presentation abstraction
//!
//! The controller never renders anything itself. It talks to a
//! [`GalleryView`], which may be a desktop window, the [`ConsoleView`] used
//! by the CLI, or the [`RecordingView`] used in tests.
//!
//! ```text
//! ┌───────────────────────────┐
//! │    LibraryController      │
//! └─────────────┬─────────────┘
//!               │ GalleryView
//!      ┌────────┴────────┐
//!      ▼                 ▼
//! ┌─────────────┐  ┌───────────────┐
//! │ ConsoleView │  │ RecordingView │
//! └─────────────┘  └───────────────┘
//! ```

pub mod console;
pub mod mock;
pub mod traits;

pub use console::ConsoleView;
pub use mock::{RecordingView, ViewEvent};
pub use traits::{Control, ControlSet, GalleryView};
