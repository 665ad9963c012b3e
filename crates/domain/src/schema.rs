use std::collections::BTreeMap;

use fieldward_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Normalizes a field name for comparison and storage keys.
#[must_use]
pub fn normalize_field_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Opaque identifier of a storage schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordType(NonEmptyString);

impl RecordType {
    /// Creates a validated, lowercase record type name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value: String = value.into();
        Ok(Self(NonEmptyString::new(value.trim().to_lowercase())?))
    }

    /// Returns the record type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Per-actor permission flags for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: NonEmptyString,
    viewable: bool,
    creatable: bool,
    updateable: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor with a normalized field name.
    pub fn new(
        name: impl AsRef<str>,
        viewable: bool,
        creatable: bool,
        updateable: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(normalize_field_name(name.as_ref()))?,
            viewable,
            creatable,
            updateable,
        })
    }

    /// Returns the normalized field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether the actor may view the field.
    #[must_use]
    pub fn is_viewable(&self) -> bool {
        self.viewable
    }

    /// Returns whether the actor may set the field on create.
    #[must_use]
    pub fn is_creatable(&self) -> bool {
        self.creatable
    }

    /// Returns whether the actor may change the field on update.
    #[must_use]
    pub fn is_updateable(&self) -> bool {
        self.updateable
    }
}

/// Immutable field permission map captured at the start of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    record_type: RecordType,
    fields: BTreeMap<String, FieldDescriptor>,
}

impl PermissionSnapshot {
    /// Creates a snapshot, rejecting duplicate field names.
    pub fn new(record_type: RecordType, fields: Vec<FieldDescriptor>) -> AppResult<Self> {
        let mut by_name = BTreeMap::new();
        for field in fields {
            let name = field.name().to_owned();
            if by_name.insert(name.clone(), field).is_some() {
                return Err(AppError::Validation(format!(
                    "duplicate field '{name}' in permission snapshot for '{record_type}'"
                )));
            }
        }

        Ok(Self {
            record_type,
            fields: by_name,
        })
    }

    /// Returns the described record type.
    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Looks up a descriptor by (case-insensitive) field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(normalize_field_name(name).as_str())
    }

    /// Iterates descriptors in name order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Returns every described field name.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Returns whether the record type describes no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
