use std::sync::Arc;

use fieldward_core::{ActorIdentity, AppError, AppResult};
use fieldward_domain::{Record, RecordType};
use fieldward_infrastructure::{
    FieldGrant, InMemoryRecordStore, InMemorySchemaProvider, ObjectGrant,
};
use serde_json::json;
use tracing::info;

const DEMO_RECORD_TYPE: &str = "contact";
const DEMO_FIELDS: &[&str] = &["full_name", "email", "credit_limit", "created_on"];
const DEMO_OTHER_OWNER: &str = "northwind-admin";

/// Demo data the walkthrough operates on.
pub struct DemoSeed {
    /// Record type registered for the demo.
    pub record_type: RecordType,
    /// Record owned by another subject.
    pub foreign_record: Record,
}

/// Registers the demo schema, grants the actor, and seeds a record owned by someone else.
pub async fn run(
    schema_provider: &InMemorySchemaProvider,
    store: &Arc<InMemoryRecordStore>,
    actor: &ActorIdentity,
) -> AppResult<DemoSeed> {
    let record_type = RecordType::new(DEMO_RECORD_TYPE)?;
    schema_provider
        .register_record_type(&record_type, DEMO_FIELDS)
        .await?;

    schema_provider
        .grant_object(
            actor.subject(),
            &record_type,
            ObjectGrant {
                can_read: true,
                can_create: true,
                can_update: true,
                can_delete: false,
            },
        )
        .await;

    for (field, can_create, can_update) in [
        ("full_name", true, true),
        ("email", true, true),
        ("credit_limit", false, false),
        ("created_on", false, false),
    ] {
        schema_provider
            .grant_field(
                actor.subject(),
                &record_type,
                field,
                FieldGrant {
                    can_view: field != "credit_limit",
                    can_create,
                    can_update,
                },
            )
            .await;
    }

    let foreign_record = store
        .seed(
            Record::new(
                record_type.clone(),
                None,
                json!({
                    "full_name": "Nancy Davolio",
                    "email": "nancy@northwind.example",
                    "credit_limit": 25000,
                    "created_on": "2024-03-01",
                }),
            )?,
            DEMO_OTHER_OWNER,
        )
        .await
        .map_err(|error| AppError::Validation(format!("failed to seed demo record: {error}")))?;

    info!(
        record_type = record_type.as_str(),
        fields = DEMO_FIELDS.len(),
        subject = actor.subject(),
        "demo schema seeded"
    );

    Ok(DemoSeed {
        record_type,
        foreign_record,
    })
}
