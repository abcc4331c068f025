use std::cell::Cell;
use std::time::Duration;

use drivedupe::drive::memory::MemoryDrive;
use drivedupe::drive::{DriveEntry, DriveError, FolderRef, ListChildren, Resilient, RetryPolicy};
use drivedupe::duplicates::{group_duplicates, EquivalenceKey};
use drivedupe::error::ExitCode;
use drivedupe::output::{ConsoleOutput, JsonReport};
use drivedupe::scanner::Enumerator;

fn fast_retries(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
}

/// Listing whose first `failures` calls per folder fail with a transient error.
struct Flaky<'a> {
    drive: &'a MemoryDrive,
    failures: u32,
    calls: Cell<u32>,
}

impl ListChildren for Flaky<'_> {
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError> {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        if n <= self.failures {
            return Err(DriveError::Status {
                status: 503,
                detail: "serviceNotAvailable".into(),
            });
        }
        self.drive.list_children(folder)
    }
}

#[test]
fn test_three_file_listing() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    drive.add_file(&root, "file1", "test.txt", 100, "hash1");
    drive.add_file(&root, "file2", "photo.jpg", 200, "hash2");
    drive.add_file(&root, "file3", "photo2.jpg", 200, "hash2");

    let inventory = Enumerator::new(&drive).enumerate(&root).unwrap();
    let names: Vec<_> = inventory.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["test.txt", "photo.jpg", "photo2.jpg"]);

    let (groups, stats) = group_duplicates(inventory.files);
    assert_eq!(groups.len(), 1);
    let class = &groups[&EquivalenceKey::new(200, "hash2")];
    assert_eq!(class.len(), 2);
    assert_eq!(class.survivor().name, "photo.jpg");
    assert_eq!(stats.reclaimable_space(&groups), 200);
}

#[test]
fn test_duplicates_across_nested_folders() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    let photos = drive.add_folder(&root, "p", "Photos");
    let backup = drive.add_folder(&photos, "b", "Backup");
    let docs = drive.add_folder(&root, "d", "Documents");

    drive.add_file(&backup, "deep", "IMG_0001.jpg", 4096, "img");
    drive.add_file(&docs, "doc", "report.pdf", 1000, "pdf");
    drive.add_file(&photos, "mid", "IMG_0001.jpg", 4096, "img");
    drive.add_file(&root, "top", "report (1).pdf", 1000, "pdf");

    let inventory = Enumerator::new(&drive).enumerate(&root).unwrap();
    let (groups, _) = group_duplicates(inventory.files);

    // Survivors are the copies closest to the root, in breadth-first order
    let survivors: Vec<_> = groups.values().map(|c| c.survivor().id.as_str()).collect();
    assert_eq!(survivors, vec!["top", "mid"]);
    assert_eq!(groups[&EquivalenceKey::new(4096, "img")].candidates()[0].id.as_str(), "deep");
}

#[test]
fn test_transient_listing_failures_are_retried() {
    let drive = MemoryDrive::new();
    drive.add_file(&FolderRef::root(), "a", "a", 1, "h");
    drive.add_file(&FolderRef::root(), "b", "b", 1, "h");

    let flaky = Flaky {
        drive: &drive,
        failures: 2,
        calls: Cell::new(0),
    };
    let resilient = Resilient::new(&flaky, fast_retries(3));

    let inventory = Enumerator::new(&resilient)
        .enumerate(&FolderRef::root())
        .unwrap();

    assert_eq!(inventory.files.len(), 2);
    assert!(!inventory.stats.is_partial());
    assert_eq!(flaky.calls.get(), 3);
}

#[test]
fn test_exhausted_retries_abandon_folder() {
    let drive = MemoryDrive::new();
    drive.add_file(&FolderRef::root(), "a", "a", 1, "h");

    let flaky = Flaky {
        drive: &drive,
        failures: 10,
        calls: Cell::new(0),
    };
    let resilient = Resilient::new(&flaky, fast_retries(4));

    let inventory = Enumerator::new(&resilient)
        .enumerate(&FolderRef::root())
        .unwrap();

    assert!(inventory.files.is_empty());
    assert!(inventory.stats.is_partial());
    assert_eq!(flaky.calls.get(), 4);
}

#[test]
fn test_permanent_listing_failure_not_retried() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    let shared = drive.add_folder(&root, "s", "Shared");
    drive.add_file(&root, "a", "a", 1, "h");
    drive.fail_listing(
        &shared,
        DriveError::Status {
            status: 403,
            detail: "accessDenied".into(),
        },
    );

    let resilient = Resilient::new(&drive, fast_retries(5));
    let inventory = Enumerator::new(&resilient).enumerate(&root).unwrap();

    assert_eq!(inventory.files.len(), 1);
    assert_eq!(inventory.stats.failed_folders.len(), 1);
    let listed_shared = drive
        .listed_folders()
        .iter()
        .filter(|f| **f == shared)
        .count();
    assert_eq!(listed_shared, 1);
}

#[test]
fn test_scan_reports() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    drive.add_file(&root, "1", "a.mp4", 10_000, "vid");
    drive.add_file(&root, "2", "b.mp4", 10_000, "vid");
    drive.add_file(&root, "3", "notes.txt", 5, "txt");

    let inventory = Enumerator::new(&drive).enumerate(&root).unwrap();
    let enumeration = inventory.stats.clone();
    let (groups, grouping) = group_duplicates(inventory.files);

    let mut text = Vec::new();
    yansi::disable();
    ConsoleOutput::new(&groups).write_to(&mut text).unwrap();
    let text = String::from_utf8(text).unwrap();
    assert!(text.starts_with("Duplicate Files Detected:\n"));
    assert!(text.contains("  - a.mp4 (https://onedrive.example/items/1)"));
    assert!(!text.contains("notes.txt"));

    let report = JsonReport::new(&groups, &grouping, &enumeration, ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(value["summary"]["total_files"], 3);
    assert_eq!(value["summary"]["folders_listed"], 1);
    assert_eq!(value["summary"]["reclaimable_space"], 10_000);
    assert_eq!(value["summary"]["exit_code_name"], "DD000");
    assert_eq!(value["duplicates"][0]["files"][0]["id"], "1");
}
