use fieldward_core::AppResult;
use fieldward_domain::{OperationMode, VisibilityScope};

/// Scope and mode an engine starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Visibility scope routed to on construction.
    pub scope: VisibilityScope,
    /// Field filtering strictness shared by every executor.
    pub mode: OperationMode,
}

impl EngineConfig {
    /// Creates a configuration from typed values.
    #[must_use]
    pub fn new(scope: VisibilityScope, mode: OperationMode) -> Self {
        Self { scope, mode }
    }

    /// Parses transport values, rejecting blank or unknown ones.
    pub fn from_transport(scope: &str, mode: &str) -> AppResult<Self> {
        Ok(Self {
            scope: VisibilityScope::from_transport(scope)?,
            mode: OperationMode::from_transport(mode)?,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(VisibilityScope::Restricted, OperationMode::AllOrNone)
    }
}
