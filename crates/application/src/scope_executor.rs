use std::collections::BTreeSet;
use std::sync::Arc;

use fieldward_core::{
    AccessKind, AccessViolation, ActorIdentity, AppError, AppResult, StorageOperation,
};
use fieldward_domain::{
    FieldAccess, FieldPermissionResolver, OperationMode, PermissionPolicy, PolicyDecision, Record,
    RecordType, VisibilityScope,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::access_ports::{BackendError, RecordQuery, SchemaProvider, ScopedDataBackend};

mod read;
mod writes;


/// Mediates record operations through one visibility-scoped backend.
///
/// The scope is taken from the backend at construction and never changes, so
/// every storage call of a mediated operation runs under the same rule set.
#[derive(Clone)]
pub struct ScopeExecutor {
    scope: VisibilityScope,
    mode: OperationMode,
    schema_provider: Arc<dyn SchemaProvider>,
    backend: Arc<dyn ScopedDataBackend>,
}

impl ScopeExecutor {
    /// Creates an executor bound to the backend's scope.
    #[must_use]
    pub fn new(
        schema_provider: Arc<dyn SchemaProvider>,
        backend: Arc<dyn ScopedDataBackend>,
        mode: OperationMode,
    ) -> Self {
        Self {
            scope: backend.scope(),
            mode,
            schema_provider,
            backend,
        }
    }

    /// Returns the scope this executor is bound to.
    #[must_use]
    pub fn scope(&self) -> VisibilityScope {
        self.scope
    }

    /// Returns the active operation mode.
    #[must_use]
    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Replaces the operation mode used by later calls.
    pub(crate) fn set_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
    }

    /// Returns fields of the record's type the actor may view.
    pub async fn viewable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        Ok(self
            .resolve_field_access(actor, record.record_type())
            .await?
            .viewable)
    }

    /// Returns fields of the record's type the actor may set on create.
    pub async fn creatable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        Ok(self
            .resolve_field_access(actor, record.record_type())
            .await?
            .creatable)
    }

    /// Returns fields of the record's type the actor may change on update.
    pub async fn updateable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        Ok(self
            .resolve_field_access(actor, record.record_type())
            .await?
            .updateable)
    }

    async fn resolve_field_access(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<FieldAccess> {
        let snapshot = self.schema_provider.describe(actor, record_type).await?;
        Ok(FieldPermissionResolver::resolve(&snapshot))
    }

    async fn require_object_access(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
        access: AccessKind,
    ) -> AppResult<()> {
        let allowed = match access {
            AccessKind::Read => {
                self.schema_provider
                    .is_accessible(actor, record_type)
                    .await?
            }
            AccessKind::Create => {
                self.schema_provider
                    .is_createable(actor, record_type)
                    .await?
            }
            AccessKind::Update => {
                self.schema_provider
                    .is_updateable(actor, record_type)
                    .await?
            }
            AccessKind::Delete => {
                self.schema_provider
                    .is_deletable(actor, record_type)
                    .await?
            }
        };

        if allowed {
            return Ok(());
        }

        warn!(
            subject = actor.subject(),
            record_type = record_type.as_str(),
            access = access.as_str(),
            scope = self.scope.as_str(),
            "object-level access denied"
        );
        Err(AccessViolation::object_level(access, record_type.as_str()).into())
    }

    fn approve_fields<S: AsRef<str>>(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
        access: AccessKind,
        requested: &[S],
        allowed: &BTreeSet<String>,
    ) -> AppResult<Vec<String>> {
        match PermissionPolicy::new(self.mode).apply(requested, allowed) {
            PolicyDecision::Approved(fields) => {
                debug!(
                    record_type = record_type.as_str(),
                    access = access.as_str(),
                    mode = self.mode.as_str(),
                    requested = requested.len(),
                    approved = fields.len(),
                    "field set filtered"
                );
                Ok(fields)
            }
            PolicyDecision::Rejected { field } => {
                warn!(
                    subject = actor.subject(),
                    record_type = record_type.as_str(),
                    access = access.as_str(),
                    field = field.as_str(),
                    "field-level access denied"
                );
                Err(AccessViolation::field_level(access, record_type.as_str(), field).into())
            }
        }
    }

    fn storage_failure(
        &self,
        operation: StorageOperation,
        record_type: &RecordType,
        source: BackendError,
    ) -> AppError {
        error!(
            operation = operation.as_str(),
            record_type = record_type.as_str(),
            scope = self.scope.as_str(),
            error = %source,
            "scoped storage call failed"
        );
        AppError::OperationFailed(operation)
    }

    async fn fetch_visible(
        &self,
        actor: &ActorIdentity,
        query: RecordQuery,
    ) -> AppResult<Record> {
        let rows = self
            .backend
            .query(actor, &query)
            .await
            .map_err(|source| {
                self.storage_failure(StorageOperation::Query, &query.record_type, source)
            })?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound {
                record_type: query.record_type.as_str().to_owned(),
            })
    }
}

fn require_field_list<S: AsRef<str>>(fields: &[S], record_type: &RecordType) -> AppResult<()> {
    if fields.is_empty() {
        return Err(AppError::InvalidArgument(format!(
            "at least one field is required for '{record_type}'"
        )));
    }

    if fields.iter().any(|field| field.as_ref().trim().is_empty()) {
        return Err(AppError::InvalidArgument(format!(
            "field names for '{record_type}' must not be blank"
        )));
    }

    Ok(())
}

fn copy_approved_fields(source: &Record, target: &mut Record, approved: &[String]) {
    for field in approved {
        let value = source.value(field).cloned().unwrap_or(Value::Null);
        target.set_value(field, value);
    }
}

fn redact_to_viewable(record: &Record, viewable: &BTreeSet<String>) -> AppResult<Record> {
    let mut redacted = Record::empty(record.record_type().clone());
    if let Some(record_id) = record.record_id() {
        redacted = redacted.with_id(record_id.as_str())?;
    }

    for (field, value) in record.data() {
        if viewable.contains(field) {
            redacted.set_value(field, value.clone());
        }
    }

    Ok(redacted)
}
