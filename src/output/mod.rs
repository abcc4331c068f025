//! Output formatters for scan results.
//!
//! - [`ConsoleOutput`]: the human-readable duplicate listing
//! - [`JsonReport`]: JSON for automation and scripting

pub mod console;
pub mod json;

pub use console::{write_deletion_summary, ConsoleOutput};
pub use json::{JsonOutputError, JsonReport};
