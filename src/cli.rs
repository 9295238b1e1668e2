//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **browse**: Discover galleries, filter them and print one page (default)
//! - **refresh**: Like browse, but re-reads metadata for the page first
//! - **config**: Show or edit cookies and watched directories
//!
//! # Examples
//!
//! ```
//! use sadpanda::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_from_args(["sadpanda", "browse", "-p", "2", "romance", "rating:>=4"]);
//! let command = cli.get_command();
//! assert_eq!(command.search_text(), "romance rating:>=4");
//! assert_eq!(command.page_index(), 1);
//! ```

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the current settings
    Show,

    /// Store the login cookies used for metadata requests
    #[command(name = "set-cookies")]
    SetCookies {
        /// Value of the ipb_member_id cookie
        member_id: String,

        /// Value of the ipb_pass_hash cookie
        pass_hash: String,
    },

    /// Watch a directory for galleries
    #[command(name = "add-dir")]
    AddDir {
        /// Directory holding a gallery manifest
        path: PathBuf,
    },

    /// Stop watching a directory
    #[command(name = "remove-dir", visible_alias = "rm")]
    RemoveDir {
        /// Directory to forget
        path: PathBuf,
    },
}

/// Query and page selection shared by the listing commands
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Search query, e.g. `romance "sea of love" rating:>=4`
    ///
    /// Put `--` before the query when it contains negated terms like `-action`.
    #[arg(value_name = "QUERY", num_args = 0..)]
    pub query: Vec<String>,

    /// Page to show, starting at 1
    #[arg(short = 'p', long = "page", value_name = "N", default_value_t = 1)]
    pub page: usize,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sadpanda")]
#[command(about = "Browse and search a local gallery catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Use this settings file instead of the default one
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress and summaries (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print a page of galleries matching a query (default)
    #[command(visible_alias = "b")]
    Browse {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Refresh metadata for the selected page, then print it
    #[command(visible_alias = "r")]
    Refresh {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    /// Query words joined back into one search string
    #[must_use]
    pub fn search_text(&self) -> String {
        match self {
            Self::Browse { list } | Self::Refresh { list } => list.query.join(" "),
            Self::Config { .. } => String::new(),
        }
    }

    /// Zero-based page index
    #[must_use]
    pub const fn page_index(&self) -> usize {
        match self {
            Self::Browse { list } | Self::Refresh { list } => list.page.saturating_sub(1),
            Self::Config { .. } => 0,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse an explicit argument list, exiting on errors like [`parse_args`](Self::parse_args)
    #[must_use]
    pub fn parse_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_from(args)
    }

    /// Get the command, defaulting to Browse if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Browse {
            list: ListArgs {
                query: Vec::new(),
                page: 1,
            },
        })
    }
}
