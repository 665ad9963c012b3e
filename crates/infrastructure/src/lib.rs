//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_record_store;
mod in_memory_schema_provider;

pub use in_memory_record_store::{InMemoryRecordStore, InMemoryScopedBackend, InMemoryStoreError};
pub use in_memory_schema_provider::{FieldGrant, InMemorySchemaProvider, ObjectGrant};
