use std::collections::HashMap;

use async_trait::async_trait;
use fieldward_core::{AccessKind, ActorIdentity, AppResult};
use fieldward_domain::{FieldDescriptor, PermissionSnapshot, Record, RecordType, VisibilityScope};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{BackendError, RecordQuery, SchemaProvider, ScopedDataBackend};

pub(crate) fn actor() -> ActorIdentity {
    ActorIdentity::new("alice", "Alice")
}

pub(crate) fn contact() -> RecordType {
    RecordType::new("contact").unwrap_or_else(|_| unreachable!())
}

pub(crate) fn descriptor(
    name: &str,
    viewable: bool,
    creatable: bool,
    updateable: bool,
) -> FieldDescriptor {
    FieldDescriptor::new(name, viewable, creatable, updateable).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn contact_record(data: Value) -> Record {
    Record::new(contact(), None, data).unwrap_or_else(|_| unreachable!())
}

pub(crate) struct FakeSchemaProvider {
    fields: Vec<FieldDescriptor>,
    denied: Vec<AccessKind>,
    pub(crate) describe_calls: Mutex<usize>,
}

impl FakeSchemaProvider {
    pub(crate) fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            denied: Vec::new(),
            describe_calls: Mutex::new(0),
        }
    }

    pub(crate) fn denying(mut self, access: AccessKind) -> Self {
        self.denied.push(access);
        self
    }

    fn allows(&self, access: AccessKind) -> bool {
        !self.denied.contains(&access)
    }
}

#[async_trait]
impl SchemaProvider for FakeSchemaProvider {
    async fn describe(
        &self,
        _actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<PermissionSnapshot> {
        *self.describe_calls.lock().await += 1;
        PermissionSnapshot::new(record_type.clone(), self.fields.clone())
    }

    async fn is_accessible(
        &self,
        _actor: &ActorIdentity,
        _record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.allows(AccessKind::Read))
    }

    async fn is_createable(
        &self,
        _actor: &ActorIdentity,
        _record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.allows(AccessKind::Create))
    }

    async fn is_updateable(
        &self,
        _actor: &ActorIdentity,
        _record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.allows(AccessKind::Update))
    }

    async fn is_deletable(
        &self,
        _actor: &ActorIdentity,
        _record_type: &RecordType,
    ) -> AppResult<bool> {
        Ok(self.allows(AccessKind::Delete))
    }
}

pub(crate) struct FakeBackend {
    scope: VisibilityScope,
    failing_reads: bool,
    failing_writes: bool,
    visible_rows: HashMap<String, Record>,
    pub(crate) queries: Mutex<Vec<RecordQuery>>,
    pub(crate) inserted: Mutex<Vec<Record>>,
    pub(crate) updated: Mutex<Vec<Record>>,
    pub(crate) deleted: Mutex<Vec<Record>>,
}

impl FakeBackend {
    pub(crate) fn new(scope: VisibilityScope) -> Self {
        Self {
            scope,
            failing_reads: false,
            failing_writes: false,
            visible_rows: HashMap::new(),
            queries: Mutex::new(Vec::new()),
            inserted: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing_reads = true;
        self.failing_writes = true;
        self
    }

    pub(crate) fn failing_writes(mut self) -> Self {
        self.failing_writes = true;
        self
    }

    pub(crate) fn with_visible_row(mut self, record: Record) -> Self {
        if let Some(record_id) = record.record_id() {
            self.visible_rows
                .insert(record_id.as_str().to_owned(), record.clone());
        }
        self
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.queries.lock().await.len() + self.write_count().await
    }

    pub(crate) async fn write_count(&self) -> usize {
        self.inserted.lock().await.len()
            + self.updated.lock().await.len()
            + self.deleted.lock().await.len()
    }

    fn fail_if_configured(&self, failing: bool) -> Result<(), BackendError> {
        if failing {
            return Err(Box::new(std::io::Error::other("storage node unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl ScopedDataBackend for FakeBackend {
    fn scope(&self) -> VisibilityScope {
        self.scope
    }

    async fn query(
        &self,
        _actor: &ActorIdentity,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, BackendError> {
        self.queries.lock().await.push(query.clone());
        self.fail_if_configured(self.failing_reads)?;

        let Some(row) = self.visible_rows.get(query.record_id.as_str()) else {
            return Ok(Vec::new());
        };

        let mut projected =
            Record::empty(row.record_type().clone()).with_id(query.record_id.as_str())?;
        for field in &query.selection {
            if let Some(value) = row.value(field) {
                projected.set_value(field, value.clone());
            }
        }

        Ok(vec![projected])
    }

    async fn insert(&self, _actor: &ActorIdentity, record: Record) -> Result<Record, BackendError> {
        self.fail_if_configured(self.failing_writes)?;
        let mut inserted = self.inserted.lock().await;
        let stored = record.with_id(format!("rec-{}", inserted.len() + 1))?;
        inserted.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, _actor: &ActorIdentity, record: Record) -> Result<Record, BackendError> {
        self.fail_if_configured(self.failing_writes)?;
        self.updated.lock().await.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, _actor: &ActorIdentity, record: &Record) -> Result<(), BackendError> {
        self.fail_if_configured(self.failing_writes)?;
        self.deleted.lock().await.push(record.clone());
        Ok(())
    }
}
