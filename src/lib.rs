//! Sadpanda - controller core for a local gallery browser
//!
//! This library keeps a master list of galleries, filters it with a small
//! query language, splits the result into pages and coordinates the
//! background work (discovery, thumbnails, metadata refresh) that feeds it.
//! Presentation is abstracted behind [`view::GalleryView`].

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod controller;
pub mod gallery;
pub mod logging;
pub mod pager;
pub mod query;
pub mod tasks;
pub mod view;
pub mod workers;

pub use controller::{LibraryController, Workers};
pub use gallery::{Gallery, GalleryId, MetadataUpdate, ThumbnailHandle};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum SadpandaError {
    /// Background task error
    #[error("Task error: {0}")]
    Task(#[from] tasks::TaskError),
    /// Worker error raised outside a task
    #[error("Worker error: {0}")]
    Worker(#[from] workers::WorkerError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
