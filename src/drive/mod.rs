//! Remote drive capabilities.
//!
//! This module defines the two capabilities the core needs from a cloud drive:
//! - [`ListChildren`]: list the direct children of a folder
//! - [`DeleteItem`]: delete a single item
//!
//! Implementations:
//! - [`graph::GraphClient`]: Microsoft Graph (OneDrive) over blocking HTTP
//! - [`memory::MemoryDrive`]: in-memory tree, used by tests and examples
//! - [`retry::Resilient`]: retry/backoff decorator around either capability
//!
//! # Example
//!
//! ```
//! use drivedupe::drive::{memory::MemoryDrive, FolderRef, ListChildren};
//!
//! let drive = MemoryDrive::new();
//! drive.add_file(&FolderRef::root(), "a", "a.txt", 10, "h1");
//!
//! let children = drive.list_children(&FolderRef::root()).unwrap();
//! assert_eq!(children.len(), 1);
//! assert!(children[0].is_file);
//! ```

pub mod graph;
pub mod memory;
pub mod retry;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

pub use retry::{Resilient, RetryPolicy};

/// Opaque identifier of a drive item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create an item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a folder, used as a traversal frontier token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderRef(pub String);

impl FolderRef {
    /// Create a folder reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The drive root (`root` is the well-known Graph alias).
    #[must_use]
    pub fn root() -> Self {
        Self("root".to_string())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A child returned by a folder listing.
///
/// Optional fields are whatever the provider chose to report; the
/// enumerator supplies defaults when turning files into descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveEntry {
    /// Provider identifier of the item
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the item carries a file facet
    pub is_file: bool,
    /// Whether the item carries a folder facet
    pub is_folder: bool,
    /// Size in bytes, if reported
    pub size: Option<u64>,
    /// Provider-computed content hash, if reported
    pub content_hash: Option<String>,
    /// User-facing URL, if reported
    pub locator: Option<String>,
}

impl DriveEntry {
    /// A file entry with every optional field populated.
    #[must_use]
    pub fn file(
        id: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        content_hash: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_file: true,
            is_folder: false,
            size: Some(size),
            content_hash: Some(content_hash.into()),
            locator: Some(locator.into()),
        }
    }

    /// A folder entry.
    #[must_use]
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_file: false,
            is_folder: true,
            size: None,
            content_hash: None,
            locator: None,
        }
    }
}

/// Errors reported by drive capabilities.
#[derive(Debug, Clone, Error)]
pub enum DriveError {
    /// No usable credential could be obtained.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The provider answered with an unexpected status.
    #[error("HTTP {status}: {detail}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or provider error message
        detail: String,
    },

    /// The request never produced a response (connection, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl DriveError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Auth(_) | Self::Decode(_) => false,
        }
    }

    /// Whether this error must abort the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// The text shown to the user when an item fails.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Capability to list the direct children of a folder.
///
/// One call returns the complete child set; implementations that page
/// internally must follow every page before returning.
pub trait ListChildren {
    /// List the children of `folder`.
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError>;
}

/// Capability to delete a single item.
pub trait DeleteItem {
    /// Delete the item. `Ok` only when the provider confirmed removal.
    fn delete_item(&self, id: &ItemId) -> Result<(), DriveError>;
}

impl<T: ListChildren + ?Sized> ListChildren for &T {
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError> {
        (**self).list_children(folder)
    }
}

impl<T: DeleteItem + ?Sized> DeleteItem for &T {
    fn delete_item(&self, id: &ItemId) -> Result<(), DriveError> {
        (**self).delete_item(id)
    }
}
