use std::collections::BTreeSet;
use std::sync::Arc;

use fieldward_core::{ActorIdentity, AppError, AppResult, NonEmptyString};
use fieldward_domain::{OperationMode, Record, RecordType, VisibilityScope};
use tracing::{info, warn};

use crate::access_ports::{SchemaProvider, ScopedDataBackend};
use crate::engine_config::EngineConfig;
use crate::scope_executor::ScopeExecutor;


/// One executor per visibility scope.
#[derive(Clone)]
pub struct ScopeExecutors {
    restricted: ScopeExecutor,
    unrestricted: ScopeExecutor,
    inherited: ScopeExecutor,
}

impl ScopeExecutors {
    /// Groups the executors, rejecting any placed in the wrong slot.
    pub fn new(
        restricted: ScopeExecutor,
        unrestricted: ScopeExecutor,
        inherited: ScopeExecutor,
    ) -> AppResult<Self> {
        for (expected, executor) in [
            (VisibilityScope::Restricted, &restricted),
            (VisibilityScope::Unrestricted, &unrestricted),
            (VisibilityScope::Inherited, &inherited),
        ] {
            if executor.scope() != expected {
                return Err(AppError::Configuration(format!(
                    "executor bound to scope '{}' cannot serve scope '{}'",
                    executor.scope(),
                    expected
                )));
            }
        }

        Ok(Self {
            restricted,
            unrestricted,
            inherited,
        })
    }

    fn get(&self, scope: VisibilityScope) -> &ScopeExecutor {
        match scope {
            VisibilityScope::Restricted => &self.restricted,
            VisibilityScope::Unrestricted => &self.unrestricted,
            VisibilityScope::Inherited => &self.inherited,
        }
    }

    fn set_mode(&mut self, mode: OperationMode) {
        self.restricted.set_mode(mode);
        self.unrestricted.set_mode(mode);
        self.inherited.set_mode(mode);
    }
}

/// Facade routing mediated record operations to the active scope's executor.
#[derive(Clone)]
pub struct AccessControlEngine {
    executors: ScopeExecutors,
    config: EngineConfig,
}

impl AccessControlEngine {
    /// Creates an engine and copies the configured mode into every executor.
    #[must_use]
    pub fn new(mut executors: ScopeExecutors, config: EngineConfig) -> Self {
        executors.set_mode(config.mode);
        Self { executors, config }
    }

    /// Builds one executor per backend sharing a single schema provider.
    pub fn from_backends(
        schema_provider: Arc<dyn SchemaProvider>,
        restricted: Arc<dyn ScopedDataBackend>,
        unrestricted: Arc<dyn ScopedDataBackend>,
        inherited: Arc<dyn ScopedDataBackend>,
        config: EngineConfig,
    ) -> AppResult<Self> {
        let executors = ScopeExecutors::new(
            ScopeExecutor::new(schema_provider.clone(), restricted, config.mode),
            ScopeExecutor::new(schema_provider.clone(), unrestricted, config.mode),
            ScopeExecutor::new(schema_provider, inherited, config.mode),
        )?;

        Ok(Self::new(executors, config))
    }

    /// Returns the active visibility scope.
    #[must_use]
    pub fn scope(&self) -> VisibilityScope {
        self.config.scope
    }

    /// Returns the active operation mode.
    #[must_use]
    pub fn mode(&self) -> OperationMode {
        self.config.mode
    }

    /// Parses and activates a visibility scope.
    ///
    /// A rejected value leaves the previous scope active.
    pub fn configure_scope(&mut self, value: &str) -> AppResult<()> {
        let scope = VisibilityScope::from_transport(value).inspect_err(|error| {
            warn!(value, error = %error, "rejected visibility scope configuration");
        })?;
        self.set_scope(scope);
        Ok(())
    }

    /// Activates a visibility scope.
    pub fn set_scope(&mut self, scope: VisibilityScope) {
        info!(
            previous = self.config.scope.as_str(),
            scope = scope.as_str(),
            "visibility scope configured"
        );
        self.config.scope = scope;
    }

    /// Parses an operation mode and propagates it to every executor.
    ///
    /// A rejected value leaves the previous mode active.
    pub fn configure_mode(&mut self, value: &str) -> AppResult<()> {
        let mode = OperationMode::from_transport(value).inspect_err(|error| {
            warn!(value, error = %error, "rejected operation mode configuration");
        })?;
        self.set_mode(mode);
        Ok(())
    }

    /// Propagates an operation mode to every executor.
    pub fn set_mode(&mut self, mode: OperationMode) {
        info!(
            previous = self.config.mode.as_str(),
            mode = mode.as_str(),
            "operation mode configured"
        );
        self.config.mode = mode;
        self.executors.set_mode(mode);
    }

    /// Inserts the approved subset of `fields_to_set` under the active scope.
    pub async fn insert<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record: &Record,
        fields_to_set: &[S],
    ) -> AppResult<Record> {
        self.active_executor()
            .insert(actor, record, fields_to_set)
            .await
    }

    /// Updates the approved subset of `fields_to_update` under the active scope.
    pub async fn update<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record: &Record,
        fields_to_update: &[S],
    ) -> AppResult<Record> {
        self.active_executor()
            .update(actor, record, fields_to_update)
            .await
    }

    /// Deletes a record under the active scope.
    pub async fn delete(&self, actor: &ActorIdentity, record: &Record) -> AppResult<()> {
        self.active_executor().delete(actor, record).await
    }

    /// Reads the viewable subset of `fields_to_read` under the active scope.
    pub async fn find<S: AsRef<str> + Sync>(
        &self,
        actor: &ActorIdentity,
        record_type: &RecordType,
        record_id: &NonEmptyString,
        fields_to_read: &[S],
    ) -> AppResult<Record> {
        self.active_executor()
            .find(actor, record_type, record_id, fields_to_read)
            .await
    }

    /// Returns fields of the record's type the actor may view.
    pub async fn viewable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        self.active_executor().viewable_fields(actor, record).await
    }

    /// Returns fields of the record's type the actor may set on create.
    pub async fn creatable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        self.active_executor().creatable_fields(actor, record).await
    }

    /// Returns fields of the record's type the actor may change on update.
    pub async fn updateable_fields(
        &self,
        actor: &ActorIdentity,
        record: &Record,
    ) -> AppResult<BTreeSet<String>> {
        self.active_executor().updateable_fields(actor, record).await
    }

    fn active_executor(&self) -> &ScopeExecutor {
        self.executors.get(self.config.scope)
    }
}
