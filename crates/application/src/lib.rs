//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_engine;
mod access_ports;
mod engine_config;
mod scope_executor;

#[cfg(test)]
mod test_fakes;

pub use access_control_engine::{AccessControlEngine, ScopeExecutors};
pub use access_ports::{BackendError, RecordQuery, SchemaProvider, ScopedDataBackend};
pub use engine_config::EngineConfig;
pub use scope_executor::ScopeExecutor;
