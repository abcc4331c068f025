//! In-memory drive.
//!
//! [`MemoryDrive`] implements both drive capabilities over a tree held in
//! memory. Listing and deletion failures can be injected per folder or per
//! item, and every call is recorded so callers can assert on the exact
//! request sequence.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{DeleteItem, DriveEntry, DriveError, FolderRef, ItemId, ListChildren};

/// Drive tree held in memory.
#[derive(Debug, Default)]
pub struct MemoryDrive {
    children: RefCell<HashMap<String, Vec<DriveEntry>>>,
    listing_failures: RefCell<HashMap<String, DriveError>>,
    delete_failures: RefCell<HashMap<String, DriveError>>,
    listed: RefCell<Vec<FolderRef>>,
    delete_requests: RefCell<Vec<ItemId>>,
}

impl MemoryDrive {
    /// Create a drive containing only an empty root folder.
    #[must_use]
    pub fn new() -> Self {
        let drive = Self::default();
        drive
            .children
            .borrow_mut()
            .insert(FolderRef::root().0, Vec::new());
        drive
    }

    /// Append an arbitrary entry under `parent`.
    pub fn add_entry(&self, parent: &FolderRef, entry: DriveEntry) {
        let mut children = self.children.borrow_mut();
        if entry.is_folder {
            children.entry(entry.id.clone()).or_default();
        }
        children.entry(parent.0.clone()).or_default().push(entry);
    }

    /// Append a file under `parent`. The locator is derived from the id.
    pub fn add_file(&self, parent: &FolderRef, id: &str, name: &str, size: u64, hash: &str) {
        let locator = format!("https://onedrive.example/items/{id}");
        self.add_entry(parent, DriveEntry::file(id, name, size, hash, locator));
    }

    /// Append a folder under `parent` and return its reference.
    pub fn add_folder(&self, parent: &FolderRef, id: &str, name: &str) -> FolderRef {
        self.add_entry(parent, DriveEntry::folder(id, name));
        FolderRef::new(id)
    }

    /// Make every listing of `folder` fail with `error`.
    pub fn fail_listing(&self, folder: &FolderRef, error: DriveError) {
        self.listing_failures
            .borrow_mut()
            .insert(folder.0.clone(), error);
    }

    /// Make every deletion of `id` fail with `error`.
    pub fn fail_delete(&self, id: &str, error: DriveError) {
        self.delete_failures
            .borrow_mut()
            .insert(id.to_string(), error);
    }

    /// Folders listed so far, in call order.
    #[must_use]
    pub fn listed_folders(&self) -> Vec<FolderRef> {
        self.listed.borrow().clone()
    }

    /// Delete requests received so far, in call order (failed ones included).
    #[must_use]
    pub fn delete_requests(&self) -> Vec<ItemId> {
        self.delete_requests.borrow().clone()
    }

    /// Whether an item with this id is still present anywhere in the tree.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.children
            .borrow()
            .values()
            .any(|entries| entries.iter().any(|e| e.id == id))
    }
}

impl ListChildren for MemoryDrive {
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError> {
        self.listed.borrow_mut().push(folder.clone());

        if let Some(err) = self.listing_failures.borrow().get(folder.as_str()) {
            return Err(err.clone());
        }

        self.children
            .borrow()
            .get(folder.as_str())
            .cloned()
            .ok_or_else(|| DriveError::Status {
                status: 404,
                detail: format!("itemNotFound: {folder}"),
            })
    }
}

impl DeleteItem for MemoryDrive {
    fn delete_item(&self, id: &ItemId) -> Result<(), DriveError> {
        self.delete_requests.borrow_mut().push(id.clone());

        if let Some(err) = self.delete_failures.borrow().get(id.as_str()) {
            return Err(err.clone());
        }

        let mut children = self.children.borrow_mut();
        for entries in children.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id.as_str()) {
                entries.remove(pos);
                return Ok(());
            }
        }

        Err(DriveError::Status {
            status: 404,
            detail: format!("itemNotFound: {id}"),
        })
    }
}
