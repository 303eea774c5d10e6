//! hookstore demo. Wires configuration, logging, an adapter, and a couple
//! of hooks together, then runs an insert and a lookup through them.

use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use hookstore_adapter::Adapter;
use hookstore_core::config::AppConfig;
use hookstore_core::types::options::FindOptions;
use hookstore_hooks::OperationKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("HOOKSTORE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;

    init_logging(&config);
    tracing::info!("Starting hookstore demo v{} (env: {})", env!("CARGO_PKG_VERSION"), env);

    let mut adapter = Adapter::new(config.store.clone());
    adapter.connect().await?;

    adapter
        .hooks()
        .register_before(OperationKind::Insert, |mut document| {
            if let Value::Object(map) = &mut document {
                map.insert("before".to_string(), Value::Bool(true));
            }
            Ok(document)
        })
        .register_after(OperationKind::Find, |mut document| {
            if let Value::Object(map) = &mut document {
                map.insert("after".to_string(), Value::Bool(true));
            }
            Ok(document)
        });

    let query = adapter.query("orm_test")?;

    let inserted = query.insert(json!({ "key": "value" })).run().await?;
    tracing::info!(result = %inserted, "Insert completed");

    let found = query
        .find_one(json!({ "key": "value" }), FindOptions::default())
        .run()
        .await?;
    tracing::info!(document = %found, "Lookup completed");

    adapter.close().await?;
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
