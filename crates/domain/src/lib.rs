//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod field_access;
mod policy;
mod record;
mod schema;
mod scope;

pub use field_access::{FieldAccess, FieldPermissionResolver};
pub use policy::{OperationMode, PermissionPolicy, PolicyDecision};
pub use record::Record;
pub use schema::{FieldDescriptor, PermissionSnapshot, RecordType, normalize_field_name};
pub use scope::VisibilityScope;
