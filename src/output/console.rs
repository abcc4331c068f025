//! Human-readable duplicate listing.
//!
//! ```text
//! Duplicate Files Detected:
//! Group 1: 2.0 KiB (hash aGFzaDE=)
//!   - photo.jpg (https://onedrive.live.com/...)
//!   - photo (1).jpg (https://onedrive.live.com/...)
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::DeletionReport;
use crate::duplicates::DuplicateGroups;

/// Writes the duplicate listing shown before any deletion.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput<'a> {
    groups: &'a DuplicateGroups,
}

impl<'a> ConsoleOutput<'a> {
    /// Create a listing for `groups`.
    #[must_use]
    pub fn new(groups: &'a DuplicateGroups) -> Self {
        Self { groups }
    }

    /// Write the listing, or the no-duplicates notice for an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            return writeln!(writer, "No duplicate files found.");
        }

        writeln!(writer, "{}", "Duplicate Files Detected:".bold())?;
        for (index, class) in self.groups.values().enumerate() {
            let hash = if class.key.content_hash.is_empty() {
                "none"
            } else {
                class.key.content_hash.as_str()
            };
            writeln!(
                writer,
                "{} {} (hash {})",
                format!("Group {}:", index + 1).cyan().bold(),
                ByteSize::b(class.key.size),
                hash.dim()
            )?;
            for file in class.files() {
                writeln!(writer, "  - {} ({})", file.name, file.locator.dim())?;
            }
        }
        Ok(())
    }
}

/// Write the closing summary of a `clean` run.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_deletion_summary<W: Write>(writer: &mut W, report: &DeletionReport) -> io::Result<()> {
    let summary = report.summary();
    if report.all_succeeded() {
        writeln!(writer, "{}", summary.green())?;
    } else {
        writeln!(writer, "{}", summary.yellow())?;
    }
    writeln!(writer, "Reclaimed {}", ByteSize::b(report.bytes_freed()))
}
