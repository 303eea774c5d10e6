//! End-to-end behaviour of hook pipelines through the adapter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use hookstore_adapter::Adapter;
use hookstore_core::error::{AppError, ErrorKind};
use hookstore_core::result::AppResult;
use hookstore_core::traits::backend::DocumentBackend;
use hookstore_core::types::document::Document;
use hookstore_core::types::options::{FindOptions, UpdateOptions};
use hookstore_core::types::results::{
    DeleteResult, InsertManyResult, InsertOneResult, UpdateResult,
};
use hookstore_hooks::{HookExecutor, HookKey, OperationKind, Phase};
use hookstore_store::memory::MemoryBackend;

/// Memory backend that counts every primitive call.
#[derive(Debug, Default)]
struct CountingBackend {
    inner: MemoryBackend,
    calls: AtomicUsize,
}

impl CountingBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentBackend for CountingBackend {
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<InsertOneResult> {
        self.hit();
        self.inner.insert_one(collection, document).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> AppResult<InsertManyResult> {
        self.hit();
        self.inner.insert_many(collection, documents).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        self.hit();
        self.inner.find(collection, filter, options).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Option<Document>> {
        self.hit();
        self.inner.find_one(collection, filter, options).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.hit();
        self.inner.update_one(collection, filter, update, options).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.hit();
        self.inner.update_many(collection, filter, update, options).await
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.hit();
        self.inner.delete_one(collection, filter).await
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.hit();
        self.inner.delete_many(collection, filter).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn close(&self) -> AppResult<()> {
        self.inner.close().await
    }
}

fn adapter() -> (Adapter, Arc<CountingBackend>) {
    let backend = Arc::new(CountingBackend::default());
    (Adapter::with_backend(backend.clone()), backend)
}

fn tag(field: &'static str) -> impl Fn(Document) -> AppResult<Document> + Send + Sync + 'static {
    move |mut value| {
        if let Value::Object(map) = &mut value {
            map.insert(field.to_string(), Value::Bool(true));
        }
        Ok(value)
    }
}

#[tokio::test]
async fn empty_phases_are_identity() {
    let (adapter, _) = adapter();
    let executor = HookExecutor::new(adapter.hooks().clone());
    let value = json!({ "key": "value", "n": [1, 2] });

    for key in HookKey::all() {
        assert_eq!(
            executor.run_phase(key.kind, key.phase, value.clone()).unwrap(),
            value
        );
    }
}

#[tokio::test]
async fn hooks_fold_in_registration_order() {
    let (adapter, _) = adapter();
    for step in ["f1", "f2", "f3"] {
        adapter.hooks().register_after(OperationKind::Find, move |mut value| {
            if let Value::Object(map) = &mut value {
                let trail = map.get("trail").and_then(Value::as_str).unwrap_or_default();
                let trail = format!("{trail}{step}");
                map.insert("trail".to_string(), Value::String(trail));
            }
            Ok(value)
        });
    }

    let query = adapter.query("orm_test").unwrap();
    query.insert(json!({ "key": "value" })).run().await.unwrap();

    let found = query
        .find_one(json!({ "key": "value" }), FindOptions::default())
        .run()
        .await
        .unwrap();
    assert_eq!(found["trail"], "f1f2f3");
}

#[tokio::test]
async fn clearing_one_kind_leaves_others_intact() {
    let (adapter, _) = adapter();
    let hooks = adapter.hooks();
    for key in HookKey::all() {
        hooks.register(key, Ok);
    }

    hooks.clear_hooks(OperationKind::Insert);

    for key in HookKey::all() {
        let expected = usize::from(key.kind != OperationKind::Insert);
        assert_eq!(hooks.handler_count(key.kind, key.phase), expected, "{key}");
    }
}

#[tokio::test]
async fn handles_keep_the_hooks_they_were_composed_with() {
    let (adapter, _) = adapter();
    let query = adapter.query("orm_test").unwrap();
    query.insert(json!({ "key": "value" })).run().await.unwrap();

    let handle = query.find_one(json!({ "key": "value" }), FindOptions::default());
    adapter.hooks().register_after(OperationKind::Find, tag("late"));

    let early = handle.run().await.unwrap();
    assert!(early.get("late").is_none());

    let fresh = query
        .find_one(json!({ "key": "value" }), FindOptions::default())
        .run()
        .await
        .unwrap();
    assert_eq!(fresh["late"], true);
}

#[tokio::test]
async fn before_hook_output_reaches_backend_and_after_hook_sees_result() {
    let (adapter, backend) = adapter();
    adapter
        .hooks()
        .register_before(OperationKind::Find, |filter| {
            Ok(json!({ "key": filter["wanted"].clone() }))
        })
        .register_after(OperationKind::Find, tag("after"));

    let query = adapter.query("orm_test").unwrap();
    query.insert(json!({ "key": "value" })).run().await.unwrap();

    let found = query
        .find_one(json!({ "wanted": "value" }), FindOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(found["key"], "value");
    assert_eq!(found["after"], true);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn insert_before_hook_does_not_apply_to_find() {
    let (adapter, backend) = adapter();
    adapter
        .hooks()
        .register_before(OperationKind::Insert, tag("before"))
        .register_after(OperationKind::Find, tag("after"));

    // Stored directly so only the find pipeline touches this document.
    backend
        .inner
        .insert_one("orm_test", json!({ "key": "value" }))
        .await
        .unwrap();

    let found = adapter
        .query("orm_test")
        .unwrap()
        .find_one(json!({ "key": "value" }), FindOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(found["key"], "value");
    assert!(found.get("before").is_none());
    assert_eq!(found["after"], true);
}

#[tokio::test]
async fn insert_then_find_one_through_hooks() {
    let (adapter, _) = adapter();
    adapter
        .hooks()
        .register_before(OperationKind::Insert, tag("before"))
        .register_after(OperationKind::Find, tag("after"));

    let query = adapter.query("orm_test").unwrap();
    let inserted = query.insert(json!({ "key": "value" })).run().await.unwrap();
    assert!(inserted.get("after").is_none());

    let found = query
        .find_one(json!({ "key": "value" }), FindOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(found["key"], "value");
    assert_eq!(found["after"], true);
    // The memory backend persists what the insert pipeline handed it.
    assert_eq!(found["before"], true);
}

#[tokio::test]
async fn failing_before_hook_skips_backend() {
    let (adapter, backend) = adapter();
    adapter
        .hooks()
        .register_before(OperationKind::Delete, |_| {
            Err(AppError::hook_failure("deletes are disabled"))
        });

    let err = adapter
        .query("orm_test")
        .unwrap()
        .delete_many(json!({}))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::HookFailure);
    assert_eq!(err.message, "deletes are disabled");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn backend_failure_skips_after_hooks() {
    let (adapter, backend) = adapter();
    let after_calls = Arc::new(AtomicUsize::new(0));
    let counter = after_calls.clone();
    adapter.hooks().register_after(OperationKind::Insert, move |value| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    });

    let err = adapter
        .query("orm_test")
        .unwrap()
        .insert(json!("not a document"))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(backend.calls(), 1);
    assert_eq!(after_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rerunning_a_handle_repeats_side_effects() {
    let (adapter, backend) = adapter();
    let handle = adapter.query("orm_test").unwrap().insert(json!({ "key": "value" }));

    handle.run().await.unwrap();
    handle.run().await.unwrap();

    assert_eq!(backend.calls(), 2);
    assert_eq!(backend.inner.count("orm_test"), 2);
}

#[tokio::test]
async fn rerunning_an_insert_with_a_fixed_id_is_rejected() {
    let (adapter, backend) = adapter();
    adapter.hooks().register_before(OperationKind::Insert, |mut value| {
        value["_id"] = json!("order-1");
        Ok(value)
    });

    let handle = adapter.query("orders").unwrap().insert(json!({ "total": 10 }));
    let first = handle.run().await.unwrap();
    assert_eq!(first["inserted_id"], "order-1");

    let err = handle.run().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Backend);
    assert_eq!(backend.inner.count("orders"), 1);
}

#[tokio::test]
async fn concurrent_handles_complete_independently() {
    let (adapter, _) = adapter();
    let query = adapter.query("orm_test").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|n| query.insert(json!({ "n": n })).spawn())
        .collect();
    for handle in handles {
        handle.await.expect("task should not panic").unwrap();
    }

    let all = query
        .find(json!({}), FindOptions::default())
        .run()
        .await
        .unwrap();
    assert_eq!(all.as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn named_registration_rejects_unknown_kinds() {
    let (adapter, _) = adapter();
    let err = adapter
        .hooks()
        .register_named("before_upsert", Ok)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownOperationKind);

    adapter.hooks().register_named("before_update", Ok).unwrap();
    assert!(adapter.hooks().has_hooks(OperationKind::Update, Phase::Before));
}
