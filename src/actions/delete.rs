//! Interactive removal of duplicate copies.
//!
//! # Overview
//!
//! The [`DeletionCoordinator`] walks the duplicate classes in mapping order.
//! For each class the first discovered file is kept unconditionally and every
//! other member is a deletion candidate. Candidates are handled one at a time:
//!
//! - in [`DeletionMode::Ask`] the user is prompted with `yes`, `no` or `all`;
//! - in [`DeletionMode::Auto`] the candidate is deleted without asking.
//!
//! Answering `all` switches to `Auto` for the rest of the run, across class
//! boundaries. The mode is carried through the run as part of the
//! [`DeletionReport`] being folded over the classes.
//!
//! # Safety
//!
//! The survivor of a class is never passed to the deletion capability. A
//! failed delete is reported and the run moves on to the next candidate;
//! only a credential failure aborts the run.
//!
//! # Example
//!
//! ```
//! use drivedupe::actions::{DeletionCoordinator, ScriptedPrompt};
//! use drivedupe::drive::{memory::MemoryDrive, FolderRef};
//! use drivedupe::duplicates::group_duplicates;
//! use drivedupe::scanner::Enumerator;
//!
//! let drive = MemoryDrive::new();
//! drive.add_file(&FolderRef::root(), "1", "a.jpg", 10, "h");
//! drive.add_file(&FolderRef::root(), "2", "a (1).jpg", 10, "h");
//!
//! let inventory = Enumerator::new(&drive).enumerate(&FolderRef::root()).unwrap();
//! let (groups, _) = group_duplicates(inventory.files);
//!
//! let mut prompt = ScriptedPrompt::new(["yes"]);
//! let mut console = Vec::new();
//! let report = DeletionCoordinator::new(&drive, &mut prompt, &mut console)
//!     .run(&groups)
//!     .unwrap();
//!
//! assert_eq!(report.kept.len(), 1);
//! assert_eq!(report.deleted.len(), 1);
//! assert!(!drive.contains("2"));
//! ```

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

use super::prompt::Prompt;
use crate::drive::{DeleteItem, DriveError};
use crate::duplicates::{DuplicateGroups, EquivalenceClass};
use crate::scanner::FileDescriptor;

/// Error type for a deletion run.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The deletion capability can no longer authenticate.
    #[error("deletion aborted: {0}")]
    Fatal(#[source] DriveError),

    /// Console or prompt I/O failed.
    #[error("console I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Whether candidates are confirmed one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionMode {
    /// Prompt for every candidate.
    #[default]
    Ask,
    /// Delete every remaining candidate without prompting.
    Auto,
}

impl fmt::Display for DeletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// A parsed answer to a deletion prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Delete this candidate.
    Yes,
    /// Keep this candidate.
    No,
    /// Delete this candidate and every later one without asking.
    All,
    /// Anything else; the candidate is skipped.
    Invalid(String),
}

impl Response {
    /// Parse a raw answer. Surrounding whitespace and case are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            "all" => Self::All,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Outcome of a deletion run.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    /// One survivor per class, in class order.
    pub kept: Vec<FileDescriptor>,
    /// Candidates confirmed deleted by the provider.
    pub deleted: Vec<FileDescriptor>,
    /// Candidates left in place (declined or invalid answer).
    pub skipped: Vec<FileDescriptor>,
    /// Candidates whose delete request failed, with the provider detail.
    pub failures: Vec<(FileDescriptor, String)>,
    /// Mode in effect when the run ended.
    pub final_mode: DeletionMode,
}

impl DeletionReport {
    fn starting_in(mode: DeletionMode) -> Self {
        Self {
            final_mode: mode,
            ..Self::default()
        }
    }

    /// Bytes freed by the confirmed deletions.
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.deleted.iter().map(|f| f.size).sum()
    }

    /// Check if every attempted delete succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deleted {} file(s), {} skipped, {} failed",
            self.deleted.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}

/// Drives the confirm/delete/skip protocol over duplicate classes.
pub struct DeletionCoordinator<D, P, W> {
    deleter: D,
    prompt: P,
    out: W,
    mode: DeletionMode,
}

impl<D: DeleteItem, P: Prompt, W: Write> DeletionCoordinator<D, P, W> {
    /// Create a coordinator starting in [`DeletionMode::Ask`].
    ///
    /// # Arguments
    ///
    /// * `deleter` - Deletion capability
    /// * `prompt` - Source of answers while in `Ask` mode
    /// * `out` - Console for progress lines
    #[must_use]
    pub fn new(deleter: D, prompt: P, out: W) -> Self {
        Self {
            deleter,
            prompt,
            out,
            mode: DeletionMode::Ask,
        }
    }

    /// Set the starting mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DeletionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Start in [`DeletionMode::Auto`] when `yes` is set.
    #[must_use]
    pub fn yes(self, yes: bool) -> Self {
        if yes {
            self.with_mode(DeletionMode::Auto)
        } else {
            self
        }
    }

    /// Process every class in mapping order.
    ///
    /// An empty mapping prints a notice and issues no requests.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::Fatal`] if a delete request fails for lack of
    /// credentials, and [`DeleteError::Io`] if the console or prompt fails.
    pub fn run(&mut self, groups: &DuplicateGroups) -> Result<DeletionReport, DeleteError> {
        if groups.is_empty() {
            writeln!(self.out, "No duplicate files found.")?;
            return Ok(DeletionReport::starting_in(self.mode));
        }

        let report = groups
            .values()
            .try_fold(DeletionReport::starting_in(self.mode), |report, class| {
                self.process_class(class, report)
            })?;

        log::info!("{} (mode: {})", report.summary(), report.final_mode);
        Ok(report)
    }

    fn process_class(
        &mut self,
        class: &EquivalenceClass,
        mut report: DeletionReport,
    ) -> Result<DeletionReport, DeleteError> {
        log::debug!(
            "Duplicate group (size: {} bytes, hash: {:?}): {} files",
            class.key.size,
            class.key.content_hash,
            class.len()
        );

        let survivor = class.survivor();
        writeln!(self.out, "Keeping: {} ({})", survivor.name, survivor.locator)?;
        report.kept.push(survivor.clone());

        let mut mode = report.final_mode;
        for candidate in class.candidates() {
            mode = self.process_candidate(candidate, mode, &mut report)?;
        }
        report.final_mode = mode;

        Ok(report)
    }

    /// Handle one candidate and return the mode for the next one.
    fn process_candidate(
        &mut self,
        candidate: &FileDescriptor,
        mode: DeletionMode,
        report: &mut DeletionReport,
    ) -> Result<DeletionMode, DeleteError> {
        let next_mode = match mode {
            DeletionMode::Auto => DeletionMode::Auto,
            DeletionMode::Ask => {
                let answer = self
                    .prompt
                    .ask(&format!("Delete '{}'? (yes/all/no): ", candidate.name))?;
                match Response::parse(&answer) {
                    Response::Yes => DeletionMode::Ask,
                    Response::All => {
                        log::debug!("Deleting all remaining duplicates without asking");
                        DeletionMode::Auto
                    }
                    Response::No => {
                        log::debug!("Skipping {} at user request", candidate.name);
                        report.skipped.push(candidate.clone());
                        return Ok(DeletionMode::Ask);
                    }
                    Response::Invalid(answer) => {
                        log::debug!("Unrecognized answer {:?} for {}", answer, candidate.name);
                        writeln!(self.out, "Invalid choice for {}. Skipping.", candidate.name)?;
                        report.skipped.push(candidate.clone());
                        return Ok(DeletionMode::Ask);
                    }
                }
            }
        };

        self.delete(candidate, report)?;
        Ok(next_mode)
    }

    fn delete(
        &mut self,
        candidate: &FileDescriptor,
        report: &mut DeletionReport,
    ) -> Result<(), DeleteError> {
        writeln!(
            self.out,
            "Deleting duplicate: {} ({})",
            candidate.name, candidate.locator
        )?;

        match self.deleter.delete_item(&candidate.id) {
            Ok(()) => {
                writeln!(self.out, "Deleted: {}", candidate.name)?;
                report.deleted.push(candidate.clone());
            }
            Err(e) if e.is_fatal() => {
                log::error!("Failed to delete {}: {}", candidate.name, e);
                return Err(DeleteError::Fatal(e));
            }
            Err(e) => {
                log::warn!("Failed to delete {} ({}): {}", candidate.name, candidate.id, e);
                let detail = e.detail();
                writeln!(self.out, "Failed to delete {}: {}", candidate.name, detail)?;
                report.failures.push((candidate.clone(), detail));
            }
        }
        Ok(())
    }
}
