//! Access-token acquisition for Microsoft Graph.
//!
//! Two traits separate acquiring a token from caching it:
//! - [`TokenSource`]: obtains a fresh token (device login, refresh grant, static token)
//! - [`CredentialProvider`]: hands out the current token and can drop it
//!
//! [`CachedCredentials`] turns any source into a provider with a single-slot
//! cache: empty until the first request, populated afterwards, emptied by
//! [`CredentialProvider::invalidate`] when the API rejects the token so the
//! next request acquires again.
//!
//! # Example
//!
//! ```
//! use drivedupe::auth::{CachedCredentials, CredentialProvider, StaticToken};
//!
//! let credentials = CachedCredentials::new(StaticToken::new("eyJ0eXAi..."));
//! assert_eq!(credentials.access_token().unwrap(), "eyJ0eXAi...");
//! ```

pub mod device_code;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

pub use device_code::DeviceCodeFlow;

/// Errors raised while obtaining an access token. All of them are fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Neither a client id nor a pre-issued token is configured.
    #[error("no client id configured - set CLIENT_ID (or DRIVEDUPE_ACCESS_TOKEN)")]
    MissingClientId,

    /// The identity platform refused to issue a token.
    #[error("authorization failed ({code}): {description}")]
    Denied {
        /// OAuth error code, e.g. `access_denied`
        code: String,
        /// Human-readable description from the identity platform
        description: String,
    },

    /// The token was rejected and cannot be renewed.
    #[error("access token expired and cannot be renewed")]
    Expired,

    /// The API still refused a freshly acquired token.
    #[error("access token rejected by the API: {0}")]
    Rejected(String),

    /// The identity platform could not be reached.
    #[error("identity platform request failed: {0}")]
    Transport(String),

    /// The identity platform answered with something unexpected.
    #[error("malformed identity platform response: {0}")]
    Malformed(String),
}

/// Obtains a new access token, without caching.
pub trait TokenSource {
    /// Acquire a token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when no usable credential can be obtained.
    fn acquire(&self) -> Result<String, AuthError>;
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn acquire(&self) -> Result<String, AuthError> {
        (**self).acquire()
    }
}

/// Supplies the access token attached to every API request.
pub trait CredentialProvider {
    /// The current token, acquiring one if none is cached.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when acquisition fails.
    fn access_token(&self) -> Result<String, AuthError>;

    /// Drop the cached token after the API rejected it.
    fn invalidate(&self);
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for &T {
    fn access_token(&self) -> Result<String, AuthError> {
        (**self).access_token()
    }

    fn invalidate(&self) {
        (**self).invalidate();
    }
}

/// Single-slot token cache in front of a [`TokenSource`].
#[derive(Debug)]
pub struct CachedCredentials<S> {
    source: S,
    slot: Mutex<Option<String>>,
}

impl<S: TokenSource> CachedCredentials<S> {
    /// Create an empty cache over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
        }
    }

    /// Whether a token is currently cached.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<S: TokenSource> CredentialProvider for CachedCredentials<S> {
    fn access_token(&self) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self.source.acquire()?;
        log::debug!("Access token acquired");
        *slot = Some(token.clone());
        Ok(token)
    }

    fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            log::debug!("Cached access token invalidated");
        }
    }
}

/// A pre-issued token, e.g. from `DRIVEDUPE_ACCESS_TOKEN`.
///
/// It is handed out once; a second acquisition means the API rejected it,
/// and since it cannot be renewed that fails with [`AuthError::Expired`].
#[derive(Debug)]
pub struct StaticToken {
    token: String,
    issued: AtomicBool,
}

impl StaticToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            issued: AtomicBool::new(false),
        }
    }
}

impl TokenSource for StaticToken {
    fn acquire(&self) -> Result<String, AuthError> {
        if self.issued.swap(true, Ordering::SeqCst) {
            Err(AuthError::Expired)
        } else {
            Ok(self.token.clone())
        }
    }
}
