//! Shared primitives for all Rust crates in Fieldward.

#![forbid(unsafe_code)]

/// Actor identity forwarded to permission and storage collaborators.
pub mod actor;
/// Rejection artifacts produced by permission checks.
pub mod violation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use actor::ActorIdentity;
pub use violation::{AccessKind, AccessViolation, StorageOperation, ViolationLevel};

/// Result type used across Fieldward crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid visibility scope or operation mode supplied at configuration time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing or empty argument rejected before any permission check or I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid input or violated domain invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor lacks an object-level or field-level permission.
    #[error("access violation: {0}")]
    AccessViolation(AccessViolation),

    /// Target record is absent or not visible under the active scope.
    #[error("not found: no visible '{record_type}' record matches the identifier")]
    NotFound {
        /// Record type that was searched.
        record_type: String,
    },

    /// Storage backend failed; native error detail is intentionally dropped.
    #[error("storage operation '{0}' failed")]
    OperationFailed(StorageOperation),
}

impl From<AccessViolation> for AppError {
    fn from(value: AccessViolation) -> Self {
        Self::AccessViolation(value)
    }
}
