//! Fieldward console harness.

#![forbid(unsafe_code)]

mod console_config;
mod demo_seed;

use std::sync::Arc;

use fieldward_application::AccessControlEngine;
use fieldward_core::{ActorIdentity, AppError};
use fieldward_domain::{OperationMode, Record};
use fieldward_infrastructure::{
    InMemoryRecordStore, InMemorySchemaProvider, InMemoryScopedBackend,
};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console_config::ConsoleConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let schema_provider = Arc::new(InMemorySchemaProvider::new());
    let store = Arc::new(InMemoryRecordStore::new());
    let seed = demo_seed::run(&schema_provider, &store, &config.actor).await?;

    let [restricted, unrestricted, inherited] = InMemoryScopedBackend::for_every_scope(store);
    let mut engine = AccessControlEngine::from_backends(
        schema_provider,
        restricted,
        unrestricted,
        inherited,
        config.engine,
    )?;

    info!(
        scope = engine.scope().as_str(),
        mode = engine.mode().as_str(),
        subject = config.actor.subject(),
        "fieldward-console started"
    );

    let payload = Record::new(
        seed.record_type.clone(),
        None,
        json!({
            "full_name": "Andrew Fuller",
            "email": "andrew@northwind.example",
            "credit_limit": 1_000_000,
        }),
    )?;
    let requested = ["full_name", "email", "credit_limit"];

    let mut inserted = match engine.insert(&config.actor, &payload, &requested).await {
        Ok(record) => Some(record),
        Err(error) => {
            report("insert", &error);
            None
        }
    };

    if inserted.is_none() && engine.mode() == OperationMode::AllOrNone {
        engine.set_mode(OperationMode::BestEffort);
        inserted = retry_insert(&engine, &config.actor, &payload, &requested).await;
    }

    if let Some(record) = &inserted {
        info!(fields = ?record.data(), "inserted record");
        if let Some(record_id) = record.record_id() {
            let found = engine
                .find(
                    &config.actor,
                    &seed.record_type,
                    record_id,
                    &["full_name", "email", "credit_limit", "created_on"],
                )
                .await;
            match found {
                Ok(found) => info!(fields = ?found.data(), "read back record"),
                Err(error) => report("find", &error),
            }
        }

        if let Err(error) = engine.delete(&config.actor, record).await {
            report("delete", &error);
        }
    }

    let change = Record::new(
        seed.record_type.clone(),
        None,
        json!({"email": "nancy.davolio@northwind.example"}),
    )?;
    let change = match seed.foreign_record.record_id() {
        Some(record_id) => change.with_id(record_id.as_str())?,
        None => change,
    };
    match engine.update(&config.actor, &change, &["email"]).await {
        Ok(record) => info!(fields = ?record.data(), "updated foreign record"),
        Err(error) => report("update", &error),
    }

    Ok(())
}

async fn retry_insert(
    engine: &AccessControlEngine,
    actor: &ActorIdentity,
    payload: &Record,
    requested: &[&str],
) -> Option<Record> {
    info!("retrying insert in best effort mode");
    match engine.insert(actor, payload, requested).await {
        Ok(record) => Some(record),
        Err(error) => {
            report("insert", &error);
            None
        }
    }
}

fn report(operation: &str, error: &AppError) {
    warn!(operation, error = %error, "mediated call rejected");
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
