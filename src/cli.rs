//! Command-line interface definitions for drivedupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, configuration) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # List duplicates in the whole drive
//! drivedupe scan
//!
//! # JSON report for scripting
//! drivedupe scan --output json
//!
//! # Remove duplicates below one folder, confirming each one
//! drivedupe clean --root 01ABCDEF
//!
//! # Remove every duplicate without asking
//! drivedupe -v clean --yes
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find and remove duplicate files in a OneDrive account.
///
/// drivedupe lists every file in the drive, groups files that share a size
/// and provider content hash, and optionally deletes the redundant copies,
/// always keeping the first copy found.
#[derive(Debug, Parser)]
#[command(name = "drivedupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for drivedupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List duplicate files without deleting anything
    Scan(ScanArgs),
    /// List duplicate files, then delete redundant copies
    Clean(CleanArgs),
}

impl Commands {
    /// Options shared by every subcommand.
    #[must_use]
    pub fn drive(&self) -> &DriveArgs {
        match self {
            Self::Scan(args) => &args.drive,
            Self::Clean(args) => &args.drive,
        }
    }
}

/// Where to look and how hard to try.
#[derive(Debug, Clone, Args)]
pub struct DriveArgs {
    /// Folder id to start from (defaults to the drive root)
    #[arg(long, value_name = "FOLDER_ID")]
    pub root: Option<String>,

    /// Total attempts per request before giving up on transient failures
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub drive: DriveArgs,

    /// Output format (text for people, json for scripting)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the clean subcommand.
#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub drive: DriveArgs,

    /// Delete every duplicate without asking
    ///
    /// The first copy found in each group is still kept.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
