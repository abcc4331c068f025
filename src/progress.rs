//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait the enumerator reports
//! to, and [`Progress`], a terminal spinner implementing it. The spinner
//! draws to stderr so console output on stdout stays clean.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::drive::FolderRef;
use crate::scanner::EnumerationStats;

/// Progress callback for drive enumeration.
///
/// Implement this trait to receive updates while the folder tree is walked.
pub trait ProgressCallback: Send + Sync {
    /// Called after a folder was listed.
    ///
    /// # Arguments
    ///
    /// * `folder` - The folder that was listed
    /// * `files` - Number of files it contained
    /// * `folders` - Number of subfolders queued for listing
    fn on_folder_listed(&self, folder: &FolderRef, files: usize, folders: usize);

    /// Called when listing a folder failed and its subtree was skipped.
    fn on_folder_failed(&self, _folder: &FolderRef, _error: &str) {}

    /// Called once when the traversal is finished.
    fn on_complete(&self, stats: &EnumerationStats);

    /// Called instead of `on_complete` when a fatal error stops the traversal.
    fn on_abort(&self, _error: &str) {}
}

/// Spinner showing folders and files seen so far.
pub struct Progress {
    bar: ProgressBar,
    folders: AtomicUsize,
    files: AtomicUsize,
    failed: AtomicUsize,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use drivedupe::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::spinner_style());
            bar.set_message("Listing drive");
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };

        Self {
            bar,
            folders: AtomicUsize::new(0),
            files: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn refresh(&self) {
        let failed = self.failed.load(Ordering::Relaxed);
        let mut message = format!(
            "Listing drive: {} folders, {} files",
            self.folders.load(Ordering::Relaxed),
            self.files.load(Ordering::Relaxed)
        );
        if failed > 0 {
            message.push_str(&format!(" ({failed} failed)"));
        }
        self.bar.set_message(message);
    }

    /// Number of folders listed so far.
    #[must_use]
    pub fn folders_seen(&self) -> usize {
        self.folders.load(Ordering::Relaxed)
    }

    /// Number of files seen so far.
    #[must_use]
    pub fn files_seen(&self) -> usize {
        self.files.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for Progress {
    fn on_folder_listed(&self, _folder: &FolderRef, files: usize, _folders: usize) {
        self.folders.fetch_add(1, Ordering::Relaxed);
        self.files.fetch_add(files, Ordering::Relaxed);
        self.refresh();
    }

    fn on_folder_failed(&self, folder: &FolderRef, _error: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.bar.println(format!("Skipped folder {folder}"));
        self.refresh();
    }

    fn on_complete(&self, stats: &EnumerationStats) {
        self.bar.finish_and_clear();
        log::debug!(
            "Listed {} folders, {} files",
            stats.folders_listed,
            stats.files_found
        );
    }

    fn on_abort(&self, error: &str) {
        self.bar.finish_and_clear();
        log::debug!("Listing stopped: {}", error);
    }
}
