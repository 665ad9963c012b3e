use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Whether a violation concerns the whole record type or a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationLevel {
    /// The actor may not perform the operation on the record type at all.
    ObjectLevel,
    /// The actor may not touch one specific field.
    FieldLevel,
}

impl ViolationLevel {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectLevel => "object_level",
            Self::FieldLevel => "field_level",
        }
    }
}

/// Permission kind that was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// View permission.
    Read,
    /// Create permission.
    Create,
    /// Update permission.
    Update,
    /// Delete permission.
    Delete,
}

impl AccessKind {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Storage primitive verbs reported by `AppError::OperationFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageOperation {
    /// Scoped read.
    Query,
    /// Scoped insert.
    Insert,
    /// Scoped update.
    Update,
    /// Scoped delete.
    Delete,
}

impl StorageOperation {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for StorageOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Rejection raised when the actor lacks a required permission.
///
/// Field-level violations always name the offending field; object-level
/// violations never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessViolation {
    level: ViolationLevel,
    access: AccessKind,
    record_type: String,
    field: Option<String>,
}

impl AccessViolation {
    /// Creates an object-level violation.
    #[must_use]
    pub fn object_level(access: AccessKind, record_type: impl Into<String>) -> Self {
        Self {
            level: ViolationLevel::ObjectLevel,
            access,
            record_type: record_type.into(),
            field: None,
        }
    }

    /// Creates a field-level violation naming the rejected field.
    #[must_use]
    pub fn field_level(
        access: AccessKind,
        record_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            level: ViolationLevel::FieldLevel,
            access,
            record_type: record_type.into(),
            field: Some(field.into()),
        }
    }

    /// Returns the violation level.
    #[must_use]
    pub fn level(&self) -> ViolationLevel {
        self.level
    }

    /// Returns the missing permission.
    #[must_use]
    pub fn access(&self) -> AccessKind {
        self.access
    }

    /// Returns the record type name.
    #[must_use]
    pub fn record_type(&self) -> &str {
        self.record_type.as_str()
    }

    /// Returns the rejected field for field-level violations.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl Display for AccessViolation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(
                formatter,
                "missing {} permission on field '{}' of '{}'",
                self.access.as_str(),
                field,
                self.record_type
            ),
            None => write!(
                formatter,
                "missing {} permission on '{}'",
                self.access.as_str(),
                self.record_type
            ),
        }
    }
}
