use std::collections::HashMap;

use async_trait::async_trait;
use fieldward_application::SchemaProvider;
use fieldward_core::{ActorIdentity, AppError, AppResult};
use fieldward_domain::{FieldDescriptor, PermissionSnapshot, RecordType, normalize_field_name};
use tokio::sync::RwLock;

/// Object-level grant for one subject and record type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectGrant {
    /// Read access for the record type.
    pub can_read: bool,
    /// Create access for the record type.
    pub can_create: bool,
    /// Update access for the record type.
    pub can_update: bool,
    /// Delete access for the record type.
    pub can_delete: bool,
}

impl ObjectGrant {
    /// Grants every object-level permission.
    #[must_use]
    pub fn full() -> Self {
        Self {
            can_read: true,
            can_create: true,
            can_update: true,
            can_delete: true,
        }
    }
}

/// Field-level grant for one subject, record type, and field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldGrant {
    /// View access for the field.
    pub can_view: bool,
    /// Create access for the field.
    pub can_create: bool,
    /// Update access for the field.
    pub can_update: bool,
}

/// In-memory schema provider evaluating explicit per-subject grants.
///
/// Anything not granted is denied.
#[derive(Debug, Default)]
pub struct InMemorySchemaProvider {
    record_types: RwLock<HashMap<String, Vec<String>>>,
    object_grants: RwLock<HashMap<(String, String), ObjectGrant>>,
    field_grants: RwLock<HashMap<(String, String, String), FieldGrant>>,
}

impl InMemorySchemaProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the fields of a record type.
    pub async fn register_record_type(
        &self,
        record_type: &RecordType,
        field_names: &[&str],
    ) -> AppResult<()> {
        let mut fields: Vec<String> = Vec::with_capacity(field_names.len());
        for name in field_names {
            let name = normalize_field_name(name);
            if name.is_empty() {
                return Err(AppError::Validation(format!(
                    "record type '{record_type}' cannot declare a blank field"
                )));
            }
            if fields.contains(&name) {
                return Err(AppError::Validation(format!(
                    "record type '{record_type}' declares field '{name}' twice"
                )));
            }
            fields.push(name);
        }

        self.record_types
            .write()
            .await
            .insert(record_type.as_str().to_owned(), fields);
        Ok(())
    }

    /// Stores the object-level grant of a subject.
    pub async fn grant_object(&self, subject: &str, record_type: &RecordType, grant: ObjectGrant) {
        self.object_grants.write().await.insert(
            (subject.to_owned(), record_type.as_str().to_owned()),
            grant,
        );
    }

    /// Stores the field-level grant of a subject.
    pub async fn grant_field(
        &self,
        subject: &str,
        record_type: &RecordType,
        field_name: &str,
        grant: FieldGrant,
    ) {
        self.field_grants.write().await.insert(
            (
                subject.to_owned(),
                record_type.as_str().to_owned(),
                normalize_field_name(field_name),
            ),
            grant,
        );
    }

    async fn object_grant(&self, actor: &ActorIdentity, record_type: &RecordType) -> ObjectGrant {
        self.object_grants
            .read()
            .await
            .get(&(actor.subject().to_owned(), record_type.as_str().to_owned()))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SchemaProvider for InMemorySchemaProvider {
    async fn describe(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<PermissionSnapshot> {
        let field_names = self
            .record_types
            .read()
            .await
            .get(record_type.as_str())
            .cloned()
            .ok_or_else(|| {
                AppError::Validation(format!("record type '{record_type}' is not registered"))
            })?;

        let field_grants = self.field_grants.read().await;
        let descriptors = field_names
            .iter()
            .map(|name| {
                let grant = field_grants
                    .get(&(
                        actor.subject().to_owned(),
                        record_type.as_str().to_owned(),
                        name.clone(),
                    ))
                    .copied()
                    .unwrap_or_default();
                FieldDescriptor::new(name, grant.can_view, grant.can_create, grant.can_update)
            })
            .collect::<AppResult<Vec<_>>>()?;

        PermissionSnapshot::new(record_type.clone(), descriptors)
    }

    async fn is_accessible(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.object_grant(actor, record_type).await.can_read)
    }

    async fn is_createable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.object_grant(actor, record_type).await.can_create)
    }

    async fn is_updateable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.object_grant(actor, record_type).await.can_update)
    }

    async fn is_deletable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.object_grant(actor, record_type).await.can_delete)
    }
}
