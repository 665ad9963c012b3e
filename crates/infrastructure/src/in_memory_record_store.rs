use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use fieldward_application::{BackendError, RecordQuery, ScopedDataBackend};
use fieldward_core::{ActorIdentity, AppError};
use fieldward_domain::{Record, VisibilityScope};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Native failures of the in-memory store.
#[derive(Debug, Error)]
pub enum InMemoryStoreError {
    /// Write targeted a record without an identifier.
    #[error("record of type '{0}' has no identifier")]
    MissingIdentifier(String),

    /// Write targeted a record that does not exist or is hidden from the actor.
    #[error("record '{record_id}' of type '{record_type}' is not writable in this scope")]
    NotWritable {
        /// Record type of the target.
        record_type: String,
        /// Identifier of the target.
        record_id: String,
    },

    /// Stored payload could not be rebuilt.
    #[error("record payload rejected: {0}")]
    InvalidRecord(#[from] AppError),
}

#[derive(Debug, Clone)]
struct StoredRecord {
    record: Record,
    owner: String,
    shared_with: BTreeSet<String>,
}

impl StoredRecord {
    fn visible_to(&self, subject: &str, scope: VisibilityScope) -> bool {
        match scope {
            VisibilityScope::Unrestricted => true,
            VisibilityScope::Restricted | VisibilityScope::Inherited => {
                self.owner == subject || self.shared_with.contains(subject)
            }
        }
    }
}

/// Shared record storage with owner/share row visibility.
///
/// `Restricted` rows are visible to their owner and to subjects they were
/// shared with; `Unrestricted` sees every row. `Inherited` applies the ambient
/// scope the store was created with.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    ambient_scope: VisibilityScope,
    records: RwLock<HashMap<(String, String), StoredRecord>>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Creates an empty store whose inherited scope behaves as `Restricted`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ambient_scope(VisibilityScope::Restricted)
    }

    /// Creates an empty store with an explicit ambient scope for `Inherited`.
    ///
    /// An ambient scope of `Inherited` is treated as `Restricted`.
    #[must_use]
    pub fn with_ambient_scope(ambient_scope: VisibilityScope) -> Self {
        let ambient_scope = match ambient_scope {
            VisibilityScope::Inherited => VisibilityScope::Restricted,
            other => other,
        };

        Self {
            ambient_scope,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a record owned by `owner`, assigning an identifier when missing.
    pub async fn seed(&self, record: Record, owner: &str) -> Result<Record, InMemoryStoreError> {
        let record = match record.record_id() {
            Some(_) => record,
            None => record.with_id(Uuid::new_v4().to_string())?,
        };
        let key = storage_key(&record)?;

        self.records.write().await.insert(
            key,
            StoredRecord {
                record: record.clone(),
                owner: owner.to_owned(),
                shared_with: BTreeSet::new(),
            },
        );

        Ok(record)
    }

    /// Makes a stored record visible to another subject under restricted scopes.
    pub async fn share(&self, record: &Record, subject: &str) -> Result<(), InMemoryStoreError> {
        let key = storage_key(record)?;
        let mut records = self.records.write().await;
        let stored = records.get_mut(&key).ok_or_else(|| not_writable(&key))?;
        stored.shared_with.insert(subject.to_owned());
        Ok(())
    }

    /// Returns a stored record regardless of visibility.
    pub async fn get(&self, record_type: &str, record_id: &str) -> Option<Record> {
        self.records
            .read()
            .await
            .get(&(record_type.to_owned(), record_id.to_owned()))
            .map(|stored| stored.record.clone())
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn effective_scope(&self, scope: VisibilityScope) -> VisibilityScope {
        match scope {
            VisibilityScope::Inherited => self.ambient_scope,
            other => other,
        }
    }
}

/// Storage primitives of an [`InMemoryRecordStore`] bound to one scope.
#[derive(Debug, Clone)]
pub struct InMemoryScopedBackend {
    store: Arc<InMemoryRecordStore>,
    scope: VisibilityScope,
}

impl InMemoryScopedBackend {
    /// Binds the store to a visibility scope.
    #[must_use]
    pub fn new(store: Arc<InMemoryRecordStore>, scope: VisibilityScope) -> Self {
        Self { store, scope }
    }

    /// Builds one backend per scope over the same store.
    #[must_use]
    pub fn for_every_scope(store: Arc<InMemoryRecordStore>) -> [Arc<Self>; 3] {
        [
            Arc::new(Self::new(store.clone(), VisibilityScope::Restricted)),
            Arc::new(Self::new(store.clone(), VisibilityScope::Unrestricted)),
            Arc::new(Self::new(store, VisibilityScope::Inherited)),
        ]
    }

    fn effective_scope(&self) -> VisibilityScope {
        self.store.effective_scope(self.scope)
    }
}

#[async_trait]
impl ScopedDataBackend for InMemoryScopedBackend {
    fn scope(&self) -> VisibilityScope {
        self.scope
    }

    async fn query(
        &self,
        actor: &ActorIdentity,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, BackendError> {
        let key = (
            query.record_type.as_str().to_owned(),
            query.record_id.as_str().to_owned(),
        );
        let records = self.store.records.read().await;
        let Some(stored) = records
            .get(&key)
            .filter(|stored| stored.visible_to(actor.subject(), self.effective_scope()))
        else {
            return Ok(Vec::new());
        };

        let mut projected = Record::empty(query.record_type.clone())
            .with_id(query.record_id.as_str())
            .map_err(InMemoryStoreError::from)?;
        for field in &query.selection {
            if let Some(value) = stored.record.value(field) {
                projected.set_value(field, value.clone());
            }
        }

        Ok(vec![projected])
    }

    async fn insert(&self, actor: &ActorIdentity, record: Record) -> Result<Record, BackendError> {
        let stored = self.store.seed(record, actor.subject()).await?;
        debug!(
            record_type = stored.record_type().as_str(),
            scope = self.scope.as_str(),
            owner = actor.subject(),
            "in-memory record inserted"
        );
        Ok(stored)
    }

    async fn update(&self, actor: &ActorIdentity, record: Record) -> Result<Record, BackendError> {
        let key = storage_key(&record)?;
        let scope = self.effective_scope();
        let mut records = self.store.records.write().await;
        let stored = records
            .get_mut(&key)
            .filter(|stored| stored.visible_to(actor.subject(), scope))
            .ok_or_else(|| not_writable(&key))?;

        let mut merged = stored.record.clone();
        for (field, value) in record.data() {
            merged.set_value(field, value.clone());
        }
        stored.record = merged.clone();

        debug!(
            record_type = key.0.as_str(),
            record_id = key.1.as_str(),
            scope = self.scope.as_str(),
            "in-memory record updated"
        );
        Ok(merged)
    }

    async fn delete(&self, actor: &ActorIdentity, record: &Record) -> Result<(), BackendError> {
        let key = storage_key(record)?;
        let scope = self.effective_scope();
        let mut records = self.store.records.write().await;

        if !records
            .get(&key)
            .is_some_and(|stored| stored.visible_to(actor.subject(), scope))
        {
            return Err(not_writable(&key).into());
        }

        records.remove(&key);
        debug!(
            record_type = key.0.as_str(),
            record_id = key.1.as_str(),
            scope = self.scope.as_str(),
            "in-memory record deleted"
        );
        Ok(())
    }
}

fn storage_key(record: &Record) -> Result<(String, String), InMemoryStoreError> {
    let record_id = record.record_id().ok_or_else(|| {
        InMemoryStoreError::MissingIdentifier(record.record_type().as_str().to_owned())
    })?;

    Ok((
        record.record_type().as_str().to_owned(),
        record_id.as_str().to_owned(),
    ))
}

fn not_writable(key: &(String, String)) -> InMemoryStoreError {
    InMemoryStoreError::NotWritable {
        record_type: key.0.clone(),
        record_id: key.1.clone(),
    }
}
