//! Structured error handling and exit codes.

use serde::Serialize;

use crate::actions::DeleteError;
use crate::auth::AuthError;
use crate::drive::DriveError;

/// Exit codes for the drivedupe application.
///
/// - 0: Success (duplicates found, or cleaned without errors)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (some folders could not be listed or some deletes failed)
/// - 4: Authentication failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Run completed and duplicates were found or cleaned.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Run completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Run completed with some non-fatal listing or delete failures.
    PartialSuccess = 3,
    /// Authentication failed: no usable access token could be obtained.
    AuthenticationFailed = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::NoDuplicates => "DD002",
            Self::PartialSuccess => "DD003",
            Self::AuthenticationFailed => "DD004",
        }
    }

    /// Pick the exit code for a failed run.
    ///
    /// Credential failures map to [`ExitCode::AuthenticationFailed`] wherever
    /// they surface in the error chain; everything else is a general error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let is_auth = err.chain().any(|cause| {
            cause.is::<AuthError>()
                || cause.downcast_ref::<DriveError>().is_some_and(DriveError::is_fatal)
                || matches!(cause.downcast_ref::<DeleteError>(), Some(DeleteError::Fatal(_)))
        });
        if is_auth {
            Self::AuthenticationFailed
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "DD000");
        assert_eq!(ExitCode::NoDuplicates.as_i32(), 2);
        assert_eq!(ExitCode::AuthenticationFailed.as_i32(), 4);
        assert_eq!(ExitCode::AuthenticationFailed.code_prefix(), "DD004");
    }

    #[test]
    fn test_auth_errors_map_to_authentication_failed() {
        let direct = anyhow::Error::new(AuthError::MissingClientId);
        assert_eq!(ExitCode::for_error(&direct), ExitCode::AuthenticationFailed);

        let wrapped = anyhow::Error::new(DriveError::Auth(AuthError::Expired))
            .context("Failed to enumerate drive");
        assert_eq!(ExitCode::for_error(&wrapped), ExitCode::AuthenticationFailed);

        let deleting = anyhow::Error::new(DeleteError::Fatal(DriveError::Auth(AuthError::Expired)));
        assert_eq!(ExitCode::for_error(&deleting), ExitCode::AuthenticationFailed);

        let rejected = anyhow::Error::new(DriveError::Auth(AuthError::Rejected(
            "InvalidAuthenticationToken".into(),
        )))
        .context("Failed to enumerate drive");
        assert_eq!(ExitCode::for_error(&rejected), ExitCode::AuthenticationFailed);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("config file not found");
        assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);

        let status = anyhow::Error::new(DriveError::Status {
            status: 500,
            detail: "boom".into(),
        });
        assert_eq!(ExitCode::for_error(&status), ExitCode::GeneralError);
    }

    #[test]
    fn test_structured_error_json() {
        let err = anyhow::anyhow!("boom").context("Failed to load configuration");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        let json = serde_json::to_string(&structured).unwrap();
        assert!(json.contains("\"code\":\"DD001\""));
        assert!(json.contains("Failed to load configuration: boom"));
    }
}
