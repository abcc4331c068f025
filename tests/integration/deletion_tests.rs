use std::time::Duration;

use drivedupe::actions::{DeleteError, DeletionCoordinator, DeletionMode, ScriptedPrompt};
use drivedupe::auth::AuthError;
use drivedupe::drive::memory::MemoryDrive;
use drivedupe::drive::{DriveError, FolderRef, Resilient, RetryPolicy};
use drivedupe::duplicates::{group_duplicates, DuplicateGroups};
use drivedupe::scanner::Enumerator;

/// Enumerate the drive and group what was found.
fn scan(drive: &MemoryDrive) -> DuplicateGroups {
    let inventory = Enumerator::new(drive)
        .enumerate(&FolderRef::root())
        .unwrap();
    group_duplicates(inventory.files).0
}

/// Drive with two classes: photo.jpg + 3 copies, video.mp4 + 1 copy in a subfolder.
fn two_class_drive() -> MemoryDrive {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    drive.add_file(&root, "p0", "photo.jpg", 200, "ph");
    drive.add_file(&root, "p1", "photo (1).jpg", 200, "ph");
    drive.add_file(&root, "v0", "video.mp4", 9000, "vh");
    let camera = drive.add_folder(&root, "cam", "Camera Roll");
    drive.add_file(&camera, "p2", "photo (2).jpg", 200, "ph");
    drive.add_file(&camera, "v1", "video.mp4", 9000, "vh");
    drive.add_file(&camera, "p3", "photo (3).jpg", 200, "ph");
    drive.add_file(&camera, "u", "unique.txt", 3, "uh");
    drive
}

fn ids(drive: &MemoryDrive) -> Vec<String> {
    drive.delete_requests().into_iter().map(|id| id.0).collect()
}

#[test]
fn test_original_three_file_run() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    drive.add_file(&root, "file1", "test.txt", 100, "hash1");
    drive.add_file(&root, "file2", "photo.jpg", 200, "hash2");
    drive.add_file(&root, "file3", "photo2.jpg", 200, "hash2");

    let groups = scan(&drive);
    let mut prompt = ScriptedPrompt::new(["yes"]);
    let mut out = Vec::new();
    let report = DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .run(&groups)
        .unwrap();

    assert_eq!(report.kept.len(), 1);
    assert_eq!(report.kept[0].name, "photo.jpg");
    assert_eq!(ids(&drive), vec!["file3"]);
    assert!(String::from_utf8(out).unwrap().contains("Deleted: photo2.jpg"));
}

#[test]
fn test_all_switches_to_auto_for_remaining_classes() {
    let drive = two_class_drive();
    let groups = scan(&drive);
    assert_eq!(groups.len(), 2);

    let mut prompt = ScriptedPrompt::new(["no", "all", "no", "no"]);
    let mut out = Vec::new();
    let report = DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .run(&groups)
        .unwrap();

    // p1 declined, "all" on p2, then p3 and v1 deleted without asking
    assert_eq!(prompt.asked().len(), 2);
    assert_eq!(prompt.remaining(), 2);
    assert_eq!(ids(&drive), vec!["p2", "p3", "v1"]);
    assert_eq!(report.final_mode, DeletionMode::Auto);

    let kept: Vec<_> = report.kept.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(kept, vec!["p0", "v0"]);
    assert!(drive.contains("p0"));
    assert!(drive.contains("p1"));
    assert!(drive.contains("v0"));
    assert!(drive.contains("u"));
}

#[test]
fn test_yes_flag_never_prompts() {
    let drive = two_class_drive();
    let groups = scan(&drive);

    let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
    let mut out = Vec::new();
    let report = DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .yes(true)
        .run(&groups)
        .unwrap();

    assert!(prompt.asked().is_empty());
    assert_eq!(report.deleted.len(), 4);
    assert_eq!(report.bytes_freed(), 3 * 200 + 9000);
    assert_eq!(report.summary(), "Deleted 4 file(s), 0 skipped, 0 failed");
}

#[test]
fn test_prompts_follow_discovery_order() {
    let drive = two_class_drive();
    let groups = scan(&drive);

    let mut prompt = ScriptedPrompt::new(["no", "no", "no", "no"]);
    let mut out = Vec::new();
    DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .run(&groups)
        .unwrap();

    assert_eq!(
        prompt.asked(),
        [
            "Delete 'photo (1).jpg'? (yes/all/no): ",
            "Delete 'photo (2).jpg'? (yes/all/no): ",
            "Delete 'photo (3).jpg'? (yes/all/no): ",
            "Delete 'video.mp4'? (yes/all/no): ",
        ]
    );
    assert!(drive.delete_requests().is_empty());
}

#[test]
fn test_already_removed_item_reports_failure() {
    let drive = MemoryDrive::new();
    let root = FolderRef::root();
    drive.add_file(&root, "a", "a.txt", 1, "h");
    drive.add_file(&root, "b", "b.txt", 1, "h");
    drive.add_file(&root, "c", "c.txt", 1, "h");
    let groups = scan(&drive);

    // removed behind our back between scan and clean
    drive.fail_delete(
        "b",
        DriveError::Status {
            status: 404,
            detail: "itemNotFound: The resource could not be found.".into(),
        },
    );

    let mut prompt = ScriptedPrompt::new(["all"]);
    let mut out = Vec::new();
    let report = DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .run(&groups)
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.kept.len(), 1);
    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("Failed to delete b.txt: itemNotFound: The resource could not be found."));
}

#[test]
fn test_credential_loss_during_clean_is_fatal() {
    let drive = two_class_drive();
    let groups = scan(&drive);
    drive.fail_delete("p2", DriveError::Auth(AuthError::Expired));

    let resilient = Resilient::new(&drive, RetryPolicy::new(3, Duration::ZERO, Duration::ZERO));
    let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
    let mut out = Vec::new();
    let result = DeletionCoordinator::new(&resilient, &mut prompt, &mut out)
        .with_mode(DeletionMode::Auto)
        .run(&groups);

    assert!(matches!(result, Err(DeleteError::Fatal(_))));
    // p1 deleted, p2 tried exactly once, nothing after it
    assert_eq!(ids(&drive), vec!["p1", "p2"]);
}

#[test]
fn test_empty_drive_issues_no_requests() {
    let drive = MemoryDrive::new();
    drive.add_file(&FolderRef::root(), "only", "only.txt", 1, "h");
    let groups = scan(&drive);

    let mut prompt = ScriptedPrompt::new(["all"]);
    let mut out = Vec::new();
    let report = DeletionCoordinator::new(&drive, &mut prompt, &mut out)
        .run(&groups)
        .unwrap();

    assert!(report.kept.is_empty());
    assert!(drive.delete_requests().is_empty());
    assert_eq!(String::from_utf8(out).unwrap(), "No duplicate files found.\n");
}
