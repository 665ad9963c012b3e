use super::*;

impl ScopeExecutor {
    /// Inserts a clean copy of `record` holding only the approved fields.
    ///
    /// The stored record is returned with only the fields the actor may view.
    pub async fn insert<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record: &Record,
        fields_to_set: &[S],
    ) -> AppResult<Record> {
        let record_type = record.record_type();
        require_field_list(fields_to_set, record_type)?;
        self.require_object_access(actor, record_type, AccessKind::Create)
            .await?;

        let field_access = self.resolve_field_access(actor, record_type).await?;
        let approved = self.approve_fields(
            actor,
            record_type,
            AccessKind::Create,
            fields_to_set,
            &field_access.creatable,
        )?;

        let mut clean = Record::empty(record_type.clone());
        copy_approved_fields(record, &mut clean, &approved);

        debug!(
            subject = actor.subject(),
            record_type = record_type.as_str(),
            scope = self.scope.as_str(),
            fields = approved.len(),
            "inserting mediated record"
        );

        let stored = self
            .backend
            .insert(actor, clean)
            .await
            .map_err(|source| {
                self.storage_failure(StorageOperation::Insert, record_type, source)
            })?;

        redact_to_viewable(&stored, &field_access.viewable)
    }

    /// Updates the persisted record with the approved fields from `record`.
    ///
    /// The write is applied to a freshly fetched copy, never to the caller's
    /// payload. A record that is absent or not visible under this scope yields
    /// `AppError::NotFound` either way. The result is redacted to viewable fields.
    pub async fn update<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record: &Record,
        fields_to_update: &[S],
    ) -> AppResult<Record> {
        let record_type = record.record_type();
        require_field_list(fields_to_update, record_type)?;
        let record_id = require_record_id(record, "update")?;
        self.require_object_access(actor, record_type, AccessKind::Update)
            .await?;

        let snapshot = self.schema_provider.describe(actor, record_type).await?;
        let mut clean = self
            .fetch_visible(
                actor,
                RecordQuery {
                    record_type: record_type.clone(),
                    record_id: record_id.clone(),
                    selection: snapshot.field_names(),
                },
            )
            .await?;

        let field_access = FieldPermissionResolver::resolve(&snapshot);
        let approved = self.approve_fields(
            actor,
            record_type,
            AccessKind::Update,
            fields_to_update,
            &field_access.updateable,
        )?;
        copy_approved_fields(record, &mut clean, &approved);

        debug!(
            subject = actor.subject(),
            record_type = record_type.as_str(),
            record_id = record_id.as_str(),
            scope = self.scope.as_str(),
            fields = approved.len(),
            "updating mediated record"
        );

        let stored = self
            .backend
            .update(actor, clean)
            .await
            .map_err(|source| {
                self.storage_failure(StorageOperation::Update, record_type, source)
            })?;

        redact_to_viewable(&stored, &field_access.viewable)
    }

    /// Deletes `record`; no field filtering applies.
    pub async fn delete(&self, actor: &ActorIdentity, record: &Record) -> AppResult<()> {
        let record_type = record.record_type();
        let record_id = require_record_id(record, "delete")?;
        self.require_object_access(actor, record_type, AccessKind::Delete)
            .await?;

        debug!(
            subject = actor.subject(),
            record_type = record_type.as_str(),
            record_id = record_id.as_str(),
            scope = self.scope.as_str(),
            "deleting mediated record"
        );

        self.backend
            .delete(actor, record)
            .await
            .map_err(|source| self.storage_failure(StorageOperation::Delete, record_type, source))
    }
}

fn require_record_id<'a>(
    record: &'a Record,
    operation: &str,
) -> AppResult<&'a fieldward_core::NonEmptyString> {
    record.record_id().ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "{operation} requires a '{}' record with an identifier",
            record.record_type()
        ))
    })
}
