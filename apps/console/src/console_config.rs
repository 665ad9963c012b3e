use std::env;

use fieldward_application::EngineConfig;
use fieldward_core::{ActorIdentity, AppResult};

/// Runtime configuration for the console harness.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Initial scope and mode of the engine.
    pub engine: EngineConfig,
    /// Actor every mediated call runs as.
    pub actor: ActorIdentity,
}

impl ConsoleConfig {
    /// Loads configuration from the environment, rejecting invalid scope or mode values.
    pub fn load() -> AppResult<Self> {
        let scope = env::var("FIELDWARD_SCOPE").unwrap_or_else(|_| "restricted".to_owned());
        let mode = env::var("FIELDWARD_MODE").unwrap_or_else(|_| "all_or_none".to_owned());
        let subject = env::var("FIELDWARD_ACTOR")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "console".to_owned());

        Ok(Self {
            engine: EngineConfig::from_transport(scope.as_str(), mode.as_str())?,
            actor: ActorIdentity::new(subject.clone(), subject),
        })
    }
}
