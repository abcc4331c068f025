//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "size": 1024,
//!       "hash": "aGFzaDE=",
//!       "files": [
//!         { "id": "01ABC", "name": "photo.jpg", "url": "https://..." },
//!         { "id": "01DEF", "name": "photo (1).jpg", "url": "https://..." }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "folders_listed": 12,
//!     "folders_failed": 0,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "exit_code": 0,
//!     "exit_code_name": "DD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroups, EquivalenceClass, GroupingStats};
use crate::error::ExitCode;
use crate::scanner::{EnumerationStats, FileDescriptor};

/// A file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Provider identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// User-facing URL
    pub url: String,
}

impl From<&FileDescriptor> for JsonFile {
    fn from(file: &FileDescriptor) -> Self {
        Self {
            id: file.id.to_string(),
            name: file.name.clone(),
            url: file.locator.clone(),
        }
    }
}

/// A single duplicate class in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Provider content hash (empty when unavailable)
    pub hash: String,
    /// Members in discovery order; the first one is the survivor
    pub files: Vec<JsonFile>,
}

impl From<&EquivalenceClass> for JsonDuplicateGroup {
    fn from(class: &EquivalenceClass) -> Self {
        Self {
            size: class.key.size,
            hash: class.key.content_hash.clone(),
            files: class.files().iter().map(JsonFile::from).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Folders listed successfully
    pub folders_listed: usize,
    /// Folders whose listing failed
    pub folders_failed: usize,
    /// Number of duplicate classes
    pub duplicate_groups: usize,
    /// Total number of redundant copies (survivors excluded)
    pub duplicate_files: usize,
    /// Space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// List of duplicate classes
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Run summary statistics
    pub summary: JsonSummary,
}

impl JsonReport {
    /// Create a report from the grouping result, enumeration statistics and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use drivedupe::duplicates::group_duplicates;
    /// use drivedupe::error::ExitCode;
    /// use drivedupe::output::JsonReport;
    /// use drivedupe::scanner::{EnumerationStats, FileDescriptor};
    ///
    /// let (groups, stats) = group_duplicates(vec![
    ///     FileDescriptor::new("1", "a.txt", 10, "h", "https://x/1"),
    ///     FileDescriptor::new("2", "b.txt", 10, "h", "https://x/2"),
    /// ]);
    ///
    /// let report = JsonReport::new(&groups, &stats, &EnumerationStats::default(), ExitCode::Success);
    /// assert_eq!(report.duplicates.len(), 1);
    /// assert_eq!(report.summary.reclaimable_space, 10);
    /// ```
    #[must_use]
    pub fn new(
        groups: &DuplicateGroups,
        grouping: &GroupingStats,
        enumeration: &EnumerationStats,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            duplicates: groups.values().map(JsonDuplicateGroup::from).collect(),
            summary: JsonSummary {
                total_files: grouping.total_files,
                folders_listed: enumeration.folders_listed,
                folders_failed: enumeration.failed_folders.len(),
                duplicate_groups: grouping.duplicate_groups,
                duplicate_files: grouping.redundant_copies(),
                reclaimable_space: grouping.reclaimable_space(groups),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
