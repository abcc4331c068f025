//! drivedupe - OneDrive duplicate cleaner
//!
//! Lists every file in a OneDrive account through Microsoft Graph, groups
//! files that share a size and provider content hash, and removes redundant
//! copies after confirmation, always keeping the first copy found.
//!
//! The pipeline is strictly sequential:
//!
//! 1. [`scanner::Enumerator`] walks the folder tree breadth-first
//! 2. [`duplicates::group_duplicates`] buckets files by (size, hash)
//! 3. [`actions::DeletionCoordinator`] keeps one survivor per class and
//!    deletes the rest

pub mod actions;
pub mod auth;
pub mod cli;
pub mod config;
pub mod drive;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io;
use std::sync::Arc;

use anyhow::Context;
use reqwest::blocking::Client;

use crate::actions::{DeletionCoordinator, StdinPrompt};
use crate::auth::{AuthError, CachedCredentials, CredentialProvider, DeviceCodeFlow, StaticToken, TokenSource};
use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::drive::graph::GraphClient;
use crate::drive::Resilient;
use crate::duplicates::group_duplicates;
use crate::error::ExitCode;
use crate::output::{write_deletion_summary, ConsoleOutput, JsonReport};
use crate::progress::Progress;
use crate::scanner::Enumerator;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error when configuration cannot be loaded, no access token
/// can be obtained, or console I/O fails. Per-folder and per-file failures
/// are not errors; they show up as [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let env_file = dotenv::dotenv().ok();

    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        yansi::disable();
    }
    if let Some(path) = env_file {
        log::debug!("Loaded environment from {}", path.display());
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_cli(cli.command.drive());
    log::debug!(
        "Graph endpoint {}, root folder {}, {} attempt(s) per request",
        config.graph_url,
        config.root_folder,
        config.retry.max_attempts
    );

    let http = Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("drivedupe/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let credentials = CachedCredentials::new(token_source(&config, http.clone())?);
    credentials
        .access_token()
        .context("Failed to acquire access token")?;

    let drive = Resilient::new(
        GraphClient::new(http, config.graph_url.clone(), &credentials),
        config.retry_policy(),
    );

    let progress = Arc::new(Progress::new(cli.quiet));
    let inventory = Enumerator::new(&drive)
        .with_progress_callback(progress)
        .enumerate(&config.root())
        .context("Failed to enumerate drive")?;

    let enumeration = inventory.stats;
    if enumeration.is_partial() {
        log::warn!(
            "{} folder(s) could not be listed; results may be incomplete",
            enumeration.failed_folders.len()
        );
    }

    let (groups, grouping) = group_duplicates(inventory.files);
    let mut stdout = io::stdout();

    match &cli.command {
        Commands::Scan(args) => {
            let code = outcome(groups.is_empty(), enumeration.is_partial());
            match args.output {
                OutputFormat::Text => {
                    ConsoleOutput::new(&groups).write_to(&mut stdout)?;
                    if !groups.is_empty() {
                        log::info!(
                            "{} redundant copies, {} bytes reclaimable",
                            grouping.redundant_copies(),
                            grouping.reclaimable_space(&groups)
                        );
                    }
                }
                OutputFormat::Json => {
                    JsonReport::new(&groups, &grouping, &enumeration, code)
                        .write_to(&mut stdout, true)?;
                }
            }
            Ok(code)
        }
        Commands::Clean(args) => {
            if !groups.is_empty() {
                ConsoleOutput::new(&groups).write_to(&mut stdout)?;
            }

            let report = DeletionCoordinator::new(&drive, StdinPrompt::new(), io::stdout())
                .yes(args.yes)
                .run(&groups)?;

            if groups.is_empty() {
                return Ok(outcome(true, enumeration.is_partial()));
            }
            write_deletion_summary(&mut stdout, &report)?;
            Ok(outcome(
                false,
                enumeration.is_partial() || !report.all_succeeded(),
            ))
        }
    }
}

/// Pick the credential source: a configured token, else the device-code login.
fn token_source(config: &Config, http: Client) -> Result<Box<dyn TokenSource>, AuthError> {
    if let Some(token) = non_blank(config.access_token.as_deref()) {
        log::debug!("Using the configured access token");
        return Ok(Box::new(StaticToken::new(token)));
    }

    let client_id = non_blank(config.client_id.as_deref()).ok_or(AuthError::MissingClientId)?;
    Ok(Box::new(DeviceCodeFlow::new(
        http,
        config.authority(),
        client_id.to_string(),
        config.scopes.clone(),
    )))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Exit code for a run that completed. Partial results win over "no duplicates".
fn outcome(no_duplicates: bool, partial: bool) -> ExitCode {
    if partial {
        ExitCode::PartialSuccess
    } else if no_duplicates {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}
