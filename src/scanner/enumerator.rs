//! Breadth-first drive traversal.
//!
//! # Overview
//!
//! The [`Enumerator`] keeps a FIFO frontier of folders seeded with the root.
//! Each step pops the oldest folder, lists it once, appends its files to the
//! inventory in listing order and pushes its subfolders to the back of the
//! frontier. The inventory is therefore in strict breadth-first order.
//!
//! A listing failure abandons that folder's subtree: it is logged, recorded
//! in [`EnumerationStats::failed_folders`], and traversal continues. Only a
//! credential failure stops the traversal, since no further request could
//! succeed. Retries are the business of the listing capability (see
//! [`Resilient`](crate::drive::Resilient)).

use std::collections::VecDeque;
use std::sync::Arc;

use super::{EnumerationStats, FileDescriptor, Inventory};
use crate::drive::{DriveError, FolderRef, ListChildren};
use crate::progress::ProgressCallback;

/// Breadth-first enumerator over a listing capability.
pub struct Enumerator<L> {
    lister: L,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<L: ListChildren> Enumerator<L> {
    /// Create an enumerator over `lister`.
    #[must_use]
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            progress: None,
        }
    }

    /// Report per-folder progress to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Walk the tree below `root` and collect every file.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures ([`DriveError::is_fatal`]).
    /// Any other listing failure is recorded in the inventory statistics.
    pub fn enumerate(&self, root: &FolderRef) -> Result<Inventory, DriveError> {
        let mut frontier = VecDeque::from([root.clone()]);
        let mut files = Vec::new();
        let mut stats = EnumerationStats::default();

        while let Some(folder) = frontier.pop_front() {
            let children = match self.lister.list_children(&folder) {
                Ok(children) => children,
                Err(e) if e.is_fatal() => {
                    log::error!("Error fetching folder {}: {}", folder, e);
                    if let Some(cb) = &self.progress {
                        cb.on_abort(&e.to_string());
                    }
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("Error fetching folder {}: {}", folder, e);
                    if let Some(cb) = &self.progress {
                        cb.on_folder_failed(&folder, &e.to_string());
                    }
                    stats.failed_folders.push((folder, e.to_string()));
                    continue;
                }
            };

            stats.folders_listed += 1;
            let mut new_files = 0usize;
            let mut new_folders = 0usize;

            for child in children {
                if child.is_file {
                    files.push(FileDescriptor::from_entry(child));
                    new_files += 1;
                } else if child.is_folder {
                    frontier.push_back(FolderRef::new(child.id));
                    new_folders += 1;
                } else {
                    log::trace!("Skipping {} ({}): neither file nor folder", child.name, child.id);
                    stats.skipped_entries += 1;
                }
            }

            log::debug!(
                "Folder {}: {} file(s), {} subfolder(s), {} queued",
                folder,
                new_files,
                new_folders,
                frontier.len()
            );
            if let Some(cb) = &self.progress {
                cb.on_folder_listed(&folder, new_files, new_folders);
            }
        }

        stats.files_found = files.len();
        log::info!(
            "Enumeration complete: {} files in {} folders ({} failed)",
            stats.files_found,
            stats.folders_listed,
            stats.failed_folders.len()
        );
        if let Some(cb) = &self.progress {
            cb.on_complete(&stats);
        }

        Ok(Inventory { files, stats })
    }
}
