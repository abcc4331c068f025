//! Retry with exponential backoff around drive capabilities.
//!
//! [`Resilient`] wraps any [`ListChildren`] or [`DeleteItem`] implementation
//! and retries calls that fail with a transient error (see
//! [`DriveError::is_transient`]). The enumerator and the deletion coordinator
//! never retry on their own; they only see the final outcome.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use drivedupe::drive::{memory::MemoryDrive, FolderRef, ListChildren, Resilient, RetryPolicy};
//!
//! let drive = MemoryDrive::new();
//! let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);
//! let resilient = Resilient::new(&drive, policy);
//!
//! assert!(resilient.list_children(&FolderRef::root()).unwrap().is_empty());
//! ```

use std::thread;
use std::time::Duration;

use super::{DeleteItem, DriveEntry, DriveError, FolderRef, ItemId, ListChildren};

/// Retry parameters: attempt budget and backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one.
    pub max_attempts: u32,
    /// Delay before the second call.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// A policy that calls exactly once.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// `base * 2^(attempt - 1)`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Run `op`, retrying transient failures until the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the last error when the failure is not transient or when
    /// every attempt failed.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, DriveError>,
    ) -> Result<T, DriveError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        log::debug!("{} giving up after {} attempt(s)", what, attempt);
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// Decorator adding retries to a drive capability.
#[derive(Debug, Clone)]
pub struct Resilient<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Resilient<T> {
    /// Wrap `inner` with `policy`.
    #[must_use]
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped capability.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl<T: ListChildren> ListChildren for Resilient<T> {
    fn list_children(&self, folder: &FolderRef) -> Result<Vec<DriveEntry>, DriveError> {
        self.policy
            .run(&format!("Listing folder {folder}"), || {
                self.inner.list_children(folder)
            })
    }
}

impl<T: DeleteItem> DeleteItem for Resilient<T> {
    fn delete_item(&self, id: &ItemId) -> Result<(), DriveError> {
        self.policy
            .run(&format!("Deleting item {id}"), || self.inner.delete_item(id))
    }
}
