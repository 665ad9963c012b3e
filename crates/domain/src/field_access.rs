use std::collections::BTreeSet;

use crate::schema::PermissionSnapshot;

/// Field names the actor may view, create, or update for one record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAccess {
    /// Fields readable by the actor.
    pub viewable: BTreeSet<String>,
    /// Fields the actor may set on create.
    pub creatable: BTreeSet<String>,
    /// Fields the actor may change on update.
    pub updateable: BTreeSet<String>,
}

/// Partitions a permission snapshot into per-permission field sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPermissionResolver;

impl FieldPermissionResolver {
    /// Resolves the three field sets; each flag is tested independently.
    #[must_use]
    pub fn resolve(snapshot: &PermissionSnapshot) -> FieldAccess {
        let mut access = FieldAccess::default();

        for field in snapshot.fields() {
            if field.is_viewable() {
                access.viewable.insert(field.name().to_owned());
            }
            if field.is_creatable() {
                access.creatable.insert(field.name().to_owned());
            }
            if field.is_updateable() {
                access.updateable.insert(field.name().to_owned());
            }
        }

        access
    }
}
