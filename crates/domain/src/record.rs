use fieldward_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{RecordType, normalize_field_name};

/// Record payload exchanged with storage backends.
///
/// Field keys are always stored normalized, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    record_type: RecordType,
    record_id: Option<NonEmptyString>,
    data: Map<String, Value>,
}

impl Record {
    /// Creates an empty record of the given type without an identifier.
    #[must_use]
    pub fn empty(record_type: RecordType) -> Self {
        Self {
            record_type,
            record_id: None,
            data: Map::new(),
        }
    }

    /// Creates a validated record from a JSON object payload.
    pub fn new(
        record_type: RecordType,
        record_id: Option<String>,
        data: Value,
    ) -> AppResult<Self> {
        let Value::Object(object) = data else {
            return Err(AppError::Validation(
                "record data must be a JSON object".to_owned(),
            ));
        };

        let mut normalized = Map::new();
        for (key, value) in object {
            let name = normalize_field_name(key.as_str());
            if name.is_empty() {
                return Err(AppError::Validation(format!(
                    "record for '{record_type}' contains a blank field name"
                )));
            }
            if normalized.insert(name.clone(), value).is_some() {
                return Err(AppError::Validation(format!(
                    "record for '{record_type}' sets field '{name}' more than once"
                )));
            }
        }

        Ok(Self {
            record_type,
            record_id: record_id.map(NonEmptyString::new).transpose()?,
            data: normalized,
        })
    }

    /// Returns a copy of this record carrying the provided identifier.
    pub fn with_id(mut self, record_id: impl Into<String>) -> AppResult<Self> {
        self.record_id = Some(NonEmptyString::new(record_id)?);
        Ok(self)
    }

    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Returns the record identifier, if the record has been persisted.
    #[must_use]
    pub fn record_id(&self) -> Option<&NonEmptyString> {
        self.record_id.as_ref()
    }

    /// Returns the value stored for a field.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(normalize_field_name(field).as_str())
    }

    /// Sets a field value, replacing any previous one.
    pub fn set_value(&mut self, field: &str, value: Value) {
        self.data.insert(normalize_field_name(field), value);
    }

    /// Returns the set field names in key order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Returns the record data as a JSON object map.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}
