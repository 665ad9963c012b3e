use async_trait::async_trait;
use fieldward_core::{ActorIdentity, AppResult, NonEmptyString};
use fieldward_domain::{PermissionSnapshot, Record, RecordType, VisibilityScope};

/// Native failure raised by a storage backend.
///
/// Executors log it and surface only the failed verb to callers.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Identifier-filtered read issued against a scoped backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Record type to read from.
    pub record_type: RecordType,
    /// Identifier the row must match.
    pub record_id: NonEmptyString,
    /// Normalized field names to project.
    pub selection: Vec<String>,
}

/// Port for per-actor schema and object permission metadata.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Describes every field of a record type with the actor's field permissions.
    async fn describe(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<PermissionSnapshot>;

    /// Returns whether the actor may read records of the type.
    async fn is_accessible(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool>;

    /// Returns whether the actor may create records of the type.
    async fn is_createable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool>;

    /// Returns whether the actor may update records of the type.
    async fn is_updateable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool>;

    /// Returns whether the actor may delete records of the type.
    async fn is_deletable(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
    ) -> AppResult<bool>;
}

/// Port for storage primitives bound to one fixed visibility scope.
#[async_trait]
pub trait ScopedDataBackend: Send + Sync {
    /// Returns the scope every primitive of this backend runs under.
    fn scope(&self) -> VisibilityScope;

    /// Returns rows visible to the actor that match the query identifier.
    async fn query(
        &self,
        actor: &ActorIdentity,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, BackendError>;

    /// Persists a new record and returns it with its assigned identifier.
    async fn insert(&self, actor: &ActorIdentity, record: Record) -> Result<Record, BackendError>;

    /// Persists changes to an existing record.
    async fn update(&self, actor: &ActorIdentity, record: Record) -> Result<Record, BackendError>;

    /// Removes an existing record.
    async fn delete(&self, actor: &ActorIdentity, record: &Record) -> Result<(), BackendError>;
}
