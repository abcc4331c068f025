//! Duplicate detection module.
//!
//! Files are considered duplicates when the provider reports the same size
//! and content hash for them. See [`groups`] for the grouping pass.

pub mod groups;

pub use groups::{
    group_duplicates, DuplicateGroups, EquivalenceClass, EquivalenceKey, GroupingStats,
};
