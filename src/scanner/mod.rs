//! Scanner module for drive traversal.
//!
//! This module provides:
//! - [`FileDescriptor`]: the immutable record kept for every file found
//! - [`Inventory`]: the flat, breadth-first list of descriptors plus statistics
//! - [`Enumerator`]: breadth-first traversal over a [`ListChildren`](crate::drive::ListChildren)
//!
//! # Example
//!
//! ```
//! use drivedupe::drive::{memory::MemoryDrive, FolderRef};
//! use drivedupe::scanner::Enumerator;
//!
//! let drive = MemoryDrive::new();
//! let docs = drive.add_folder(&FolderRef::root(), "d1", "Documents");
//! drive.add_file(&FolderRef::root(), "f1", "a.txt", 10, "h1");
//! drive.add_file(&docs, "f2", "b.txt", 10, "h1");
//!
//! let inventory = Enumerator::new(&drive).enumerate(&FolderRef::root()).unwrap();
//! let names: Vec<_> = inventory.files.iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(names, ["a.txt", "b.txt"]);
//! ```

pub mod enumerator;

use serde::{Deserialize, Serialize};

use crate::drive::{DriveEntry, FolderRef, ItemId};

pub use enumerator::Enumerator;

/// Metadata for a discovered file.
///
/// Size and hash are whatever the provider reported; missing values are
/// defaulted to `0` and `""` so every descriptor can be grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Provider identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Provider-computed content hash, empty when unavailable
    pub content_hash: String,
    /// User-facing URL, empty when unavailable
    pub locator: String,
}

impl FileDescriptor {
    /// Create a new FileDescriptor.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        content_hash: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            size,
            content_hash: content_hash.into(),
            locator: locator.into(),
        }
    }

    /// Build a descriptor from a listing entry, defaulting missing fields.
    #[must_use]
    pub fn from_entry(entry: DriveEntry) -> Self {
        Self {
            id: ItemId(entry.id),
            name: entry.name,
            size: entry.size.unwrap_or(0),
            content_hash: entry.content_hash.unwrap_or_default(),
            locator: entry.locator.unwrap_or_default(),
        }
    }
}

/// Statistics collected during a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Folders listed successfully
    pub folders_listed: usize,
    /// Folders whose listing failed, with the error text
    pub failed_folders: Vec<(FolderRef, String)>,
    /// Files added to the inventory
    pub files_found: usize,
    /// Children that were neither files nor folders
    pub skipped_entries: usize,
}

impl EnumerationStats {
    /// Whether some part of the tree is missing from the inventory.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed_folders.is_empty()
    }
}

/// Result of a traversal.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Files in breadth-first discovery order
    pub files: Vec<FileDescriptor>,
    /// Traversal statistics
    pub stats: EnumerationStats,
}

impl Inventory {
    /// Total size of all files in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
