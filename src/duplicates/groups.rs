//! Duplicate grouping by (size, content hash).
//!
//! # Overview
//!
//! Files are bucketed by their [`EquivalenceKey`] in a single pass. Buckets
//! keep the order in which files were discovered, and the mapping keeps the
//! order in which keys were first seen, so the result is fully determined by
//! the input order. Buckets holding a single file are dropped.
//!
//! No content is read: two files are duplicates exactly when the provider
//! reported the same size and the same hash for them.
//!
//! # Example
//!
//! ```
//! use drivedupe::scanner::FileDescriptor;
//! use drivedupe::duplicates::{group_duplicates, EquivalenceKey};
//!
//! let files = vec![
//!     FileDescriptor::new("1", "a.txt", 100, "h1", ""),
//!     FileDescriptor::new("2", "b.jpg", 200, "h2", ""),
//!     FileDescriptor::new("3", "c.jpg", 200, "h2", ""),
//! ];
//!
//! let (groups, stats) = group_duplicates(files);
//!
//! assert_eq!(groups.len(), 1);
//! let class = &groups[&EquivalenceKey::new(200, "h2")];
//! assert_eq!(class.len(), 2);
//! assert_eq!(class.survivor().name, "b.jpg");
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scanner::FileDescriptor;

/// Key under which files are considered duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EquivalenceKey {
    /// File size in bytes
    pub size: u64,
    /// Provider content hash (empty when the provider reported none)
    pub content_hash: String,
}

impl EquivalenceKey {
    /// Create a key.
    #[must_use]
    pub fn new(size: u64, content_hash: impl Into<String>) -> Self {
        Self {
            size,
            content_hash: content_hash.into(),
        }
    }

    /// The key of a descriptor.
    #[must_use]
    pub fn of(file: &FileDescriptor) -> Self {
        Self::new(file.size, file.content_hash.clone())
    }

    /// Whether the key lacks a content hash.
    #[must_use]
    pub fn has_empty_hash(&self) -> bool {
        self.content_hash.is_empty()
    }
}

/// Files sharing an [`EquivalenceKey`], in discovery order.
///
/// A class always holds at least one file; members can only be added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    /// Shared key
    pub key: EquivalenceKey,
    files: Vec<FileDescriptor>,
}

impl EquivalenceClass {
    /// Create a class with a first member.
    #[must_use]
    pub fn new(key: EquivalenceKey, first: FileDescriptor) -> Self {
        Self {
            key,
            files: vec![first],
        }
    }

    /// Add a file to this class.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the file's key differs from the class key.
    pub fn add(&mut self, file: FileDescriptor) {
        debug_assert_eq!(
            EquivalenceKey::of(&file),
            self.key,
            "File {} does not belong to class {:?}",
            file.name,
            self.key
        );
        self.files.push(file);
    }

    /// Members in discovery order.
    #[must_use]
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Consume the class, returning its members.
    #[must_use]
    pub fn into_files(self) -> Vec<FileDescriptor> {
        self.files
    }

    /// Number of files in this class.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this class is empty (never true for a constructed class).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The member that is always kept: the first one discovered.
    #[must_use]
    pub fn survivor(&self) -> &FileDescriptor {
        &self.files[0]
    }

    /// Members offered for deletion: everything after the survivor.
    #[must_use]
    pub fn candidates(&self) -> &[FileDescriptor] {
        &self.files[1..]
    }

    /// Space freed if every candidate were deleted.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        let copies = u64::try_from(self.candidates().len()).unwrap_or(u64::MAX);
        self.key.size.saturating_mul(copies)
    }
}

/// Duplicate classes keyed by their shared key, in first-seen order.
pub type DuplicateGroups = IndexMap<EquivalenceKey, EquivalenceClass>;

/// Statistics from the grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct keys seen
    pub unique_keys: usize,
    /// Number of classes with 2+ files
    pub duplicate_groups: usize,
    /// Number of files in those classes (survivors included)
    pub duplicate_files: usize,
    /// Number of files dropped because their key was unique
    pub eliminated_unique: usize,
    /// Number of grouped files whose key has no content hash
    pub missing_hash: usize,
}

impl GroupingStats {
    /// Number of deletion candidates (grouped files minus one survivor per class).
    #[must_use]
    pub fn redundant_copies(&self) -> usize {
        self.duplicate_files - self.duplicate_groups
    }

    /// Space freed if every candidate were deleted.
    #[must_use]
    pub fn reclaimable_space(&self, groups: &DuplicateGroups) -> u64 {
        groups
            .values()
            .map(EquivalenceClass::wasted_space)
            .fold(0, u64::saturating_add)
    }
}

/// Group files into duplicate classes.
///
/// Single pass over `files`: each file is appended to the bucket of its
/// (size, hash) key, then buckets with one file are dropped.
///
/// # Returns
///
/// A tuple of:
/// - [`DuplicateGroups`] - Classes with 2+ files, in first-seen key order
/// - [`GroupingStats`] - Statistics about the grouping operation
///
/// Files without a content hash are grouped like any other: same-size
/// files that all lack a hash end up in one class. Such classes are logged
/// as a warning so they can be reviewed before deleting.
#[must_use]
pub fn group_duplicates(
    files: impl IntoIterator<Item = FileDescriptor>,
) -> (DuplicateGroups, GroupingStats) {
    let mut groups = DuplicateGroups::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size = stats.total_size.saturating_add(file.size);

        let key = EquivalenceKey::of(&file);
        match groups.get_mut(&key) {
            Some(class) => class.add(file),
            None => {
                groups.insert(key.clone(), EquivalenceClass::new(key, file));
            }
        }
    }

    stats.unique_keys = groups.len();

    groups.retain(|key, class| {
        if class.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique key {:?}: {}", key, class.files[0].name);
            return false;
        }

        stats.duplicate_groups += 1;
        stats.duplicate_files += class.len();
        if key.has_empty_hash() {
            stats.missing_hash += class.len();
            log::warn!(
                "{} files of {} bytes have no content hash and were grouped by size alone",
                class.len(),
                key.size
            );
        }
        log::debug!(
            "Duplicate class ({} bytes, hash {:?}): {} files",
            key.size,
            key.content_hash,
            class.len()
        );
        true
    });

    log::info!(
        "Grouping complete: {} files -> {} duplicate groups ({} redundant copies)",
        stats.total_files,
        stats.duplicate_groups,
        stats.redundant_copies()
    );

    (groups, stats)
}
