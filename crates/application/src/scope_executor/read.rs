use fieldward_core::NonEmptyString;

use super::*;

impl ScopeExecutor {
    /// Reads one record, returning only fields the actor may view.
    pub async fn find<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
        record_id: &NonEmptyString,
        fields_to_read: &[S],
    ) -> AppResult<Record> {
        require_field_list(fields_to_read, record_type)?;
        self.require_object_access(actor, record_type, AccessKind::Read)
            .await?;

        let field_access = self.resolve_field_access(actor, record_type).await?;
        let approved = self.approve_fields(
            actor,
            record_type,
            AccessKind::Read,
            fields_to_read,
            &field_access.viewable,
        )?;

        let row = self
            .fetch_visible(
                actor,
                RecordQuery {
                    record_type: record_type.clone(),
                    record_id: record_id.clone(),
                    selection: approved.clone(),
                },
            )
            .await?;

        let approved: BTreeSet<String> = approved.into_iter().collect();
        let row = row.with_id(record_id.as_str())?;
        redact_to_viewable(&row, &approved)
    }
}
