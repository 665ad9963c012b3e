use std::sync::Arc;

use fieldward_application::{AccessControlEngine, EngineConfig, RecordQuery, ScopedDataBackend};
use fieldward_core::{ActorIdentity, AppError, NonEmptyString, StorageOperation};
use fieldward_domain::{OperationMode, Record, RecordType, VisibilityScope};
use serde_json::json;

use crate::{FieldGrant, InMemorySchemaProvider, ObjectGrant};

use super::{InMemoryRecordStore, InMemoryScopedBackend};

fn contact() -> RecordType {
    RecordType::new("contact").unwrap_or_else(|_| unreachable!())
}

fn alice() -> ActorIdentity {
    ActorIdentity::new("alice", "Alice")
}

fn bob() -> ActorIdentity {
    ActorIdentity::new("bob", "Bob")
}

fn query_for(record: &Record) -> RecordQuery {
    RecordQuery {
        record_type: contact(),
        record_id: record
            .record_id()
            .cloned()
            .unwrap_or_else(|| unreachable!()),
        selection: vec!["name".to_owned()],
    }
}

async fn seeded_store(owner: &str) -> (Arc<InMemoryRecordStore>, Record) {
    let store = Arc::new(InMemoryRecordStore::new());
    let record = Record::new(
        contact(),
        None,
        json!({"name": "Ada", "email": "ada@example.com"}),
    )
    .unwrap_or_else(|_| unreachable!());
    let record = store
        .seed(record, owner)
        .await
        .unwrap_or_else(|_| unreachable!());
    (store, record)
}

async fn engine_over(
    store: Arc<InMemoryRecordStore>,
    config: EngineConfig,
) -> AccessControlEngine {
    let schema_provider = Arc::new(InMemorySchemaProvider::new());
    let registered = schema_provider
        .register_record_type(&contact(), &["name", "email"])
        .await;
    assert!(registered.is_ok());

    for subject in ["alice", "bob"] {
        schema_provider
            .grant_object(subject, &contact(), ObjectGrant::full())
            .await;
        schema_provider
            .grant_field(
                subject,
                &contact(),
                "name",
                FieldGrant {
                    can_view: true,
                    can_create: true,
                    can_update: true,
                },
            )
            .await;
        schema_provider
            .grant_field(
                subject,
                &contact(),
                "email",
                FieldGrant {
                    can_view: true,
                    can_create: false,
                    can_update: false,
                },
            )
            .await;
    }

    let [restricted, unrestricted, inherited] = InMemoryScopedBackend::for_every_scope(store);
    AccessControlEngine::from_backends(schema_provider, restricted, unrestricted, inherited, config)
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn restricted_query_hides_rows_owned_by_others() {
    let (store, record) = seeded_store("alice").await;
    let restricted = InMemoryScopedBackend::new(store.clone(), VisibilityScope::Restricted);
    let unrestricted = InMemoryScopedBackend::new(store, VisibilityScope::Unrestricted);

    let hidden = restricted.query(&bob(), &query_for(&record)).await;
    let visible = unrestricted.query(&bob(), &query_for(&record)).await;

    assert!(matches!(hidden, Ok(rows) if rows.is_empty()));
    let rows = visible.unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field_names().collect::<Vec<_>>(), vec!["name"]);
}

#[tokio::test]
async fn shared_rows_become_visible_under_restricted_scope() {
    let (store, record) = seeded_store("alice").await;
    assert!(store.share(&record, "bob").await.is_ok());
    let restricted = InMemoryScopedBackend::new(store, VisibilityScope::Restricted);

    let rows = restricted.query(&bob(), &query_for(&record)).await;
    assert!(matches!(rows, Ok(rows) if rows.len() == 1));
}

#[tokio::test]
async fn inherited_scope_follows_the_ambient_scope() {
    let store = Arc::new(InMemoryRecordStore::with_ambient_scope(
        VisibilityScope::Unrestricted,
    ));
    let record = store
        .seed(
            Record::new(contact(), None, json!({"name": "Ada"})).unwrap_or_else(|_| unreachable!()),
            "alice",
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let inherited = InMemoryScopedBackend::new(store, VisibilityScope::Inherited);

    let rows = inherited.query(&bob(), &query_for(&record)).await;
    assert!(matches!(rows, Ok(rows) if rows.len() == 1));
}

#[tokio::test]
async fn delete_of_hidden_row_fails_in_restricted_scope() {
    let (store, record) = seeded_store("alice").await;
    let restricted = InMemoryScopedBackend::new(store.clone(), VisibilityScope::Restricted);

    let result = restricted.delete(&bob(), &record).await;

    assert!(result.is_err());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn engine_update_of_invisible_row_is_not_found() {
    let (store, record) = seeded_store("alice").await;
    let engine = engine_over(store.clone(), EngineConfig::default()).await;
    let change = Record::new(contact(), None, json!({"name": "Grace"}))
        .and_then(|change| change.with_id(record.record_id().map_or("", NonEmptyString::as_str)))
        .unwrap_or_else(|_| unreachable!());

    let result = engine.update(&bob(), &change, &["name"]).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
    let stored = store
        .get("contact", record.record_id().map_or("", NonEmptyString::as_str))
        .await;
    assert_eq!(
        stored.and_then(|stored| stored.value("name").cloned()),
        Some(json!("Ada"))
    );
}

#[tokio::test]
async fn engine_update_under_unrestricted_scope_reaches_foreign_row() {
    let (store, record) = seeded_store("alice").await;
    let engine = engine_over(
        store.clone(),
        EngineConfig::new(VisibilityScope::Unrestricted, OperationMode::BestEffort),
    )
    .await;
    let change = Record::new(
        contact(),
        None,
        json!({"name": "Grace", "email": "grace@example.com"}),
    )
    .and_then(|change| change.with_id(record.record_id().map_or("", NonEmptyString::as_str)))
    .unwrap_or_else(|_| unreachable!());

    let result = engine.update(&bob(), &change, &["name", "email"]).await;

    let Ok(updated) = result else {
        panic!("unrestricted update should succeed");
    };
    assert_eq!(updated.value("name"), Some(&json!("Grace")));
    assert_eq!(updated.value("email"), Some(&json!("ada@example.com")));
}

#[tokio::test]
async fn engine_insert_then_find_round_trips_through_the_store() {
    let store = Arc::new(InMemoryRecordStore::new());
    let engine = engine_over(
        store.clone(),
        EngineConfig::new(VisibilityScope::Restricted, OperationMode::BestEffort),
    )
    .await;
    let payload = Record::new(
        contact(),
        None,
        json!({"name": "Ada", "email": "ada@example.com"}),
    )
    .unwrap_or_else(|_| unreachable!());

    let inserted = engine
        .insert(&alice(), &payload, &["name", "email"])
        .await
        .unwrap_or_else(|_| unreachable!());
    let Some(record_id) = inserted.record_id() else {
        panic!("insert should assign an identifier");
    };

    let found = engine
        .find(&alice(), &contact(), record_id, &["name", "email"])
        .await;
    let hidden = engine
        .find(&bob(), &contact(), record_id, &["name"])
        .await;

    let Ok(found) = found else {
        panic!("owner should see the inserted record");
    };
    assert_eq!(found.value("name"), Some(&json!("Ada")));
    assert!(found.value("email").is_none());
    assert!(matches!(hidden, Err(AppError::NotFound { .. })));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn engine_delete_of_hidden_row_reports_operation_failed() {
    let (store, record) = seeded_store("alice").await;
    let engine = engine_over(store.clone(), EngineConfig::default()).await;

    let result = engine.delete(&bob(), &record).await;

    assert!(matches!(
        result,
        Err(AppError::OperationFailed(StorageOperation::Delete))
    ));
    assert!(!store.is_empty().await);
}
