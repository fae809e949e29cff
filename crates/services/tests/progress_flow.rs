use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use roadmap_core::StorageKeys;
use roadmap_core::model::{Catalog, CatalogItem, Completion, ItemId, Phase, PhaseId};
use services::{ChangeCause, ProgressError, ProgressService};
use storage::repository::{InMemoryStore, KeyValueStore, StorageError};

const PROGRESS_KEY: &str = "cyberpath-progress";

fn phase(id: &str, items: &[&str]) -> Phase {
    Phase::new(
        PhaseId::new(id).unwrap(),
        id,
        items
            .iter()
            .map(|item| CatalogItem::new(ItemId::new(*item).unwrap(), *item).unwrap())
            .collect(),
    )
    .unwrap()
}

/// Four SOC items and three hacking items.
fn seven_item_catalog() -> Catalog {
    Catalog::new(vec![
        phase("soc", &["soc-linux", "soc-siem", "soc-ir", "soc-mitre"]),
        phase("hack", &["hack-web", "hack-owasp", "hack-recon"]),
    ])
    .unwrap()
}

async fn open(store: Arc<dyn KeyValueStore>) -> ProgressService {
    ProgressService::initialize(seven_item_catalog(), store, &StorageKeys::default()).await
}

/// Backend whose reads and/or writes always fail.
#[derive(Default)]
struct BrokenStore {
    fail_reads: bool,
    writes: AtomicUsize,
}

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            Err(StorageError::Connection("disk unplugged".into()))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Connection("quota exceeded".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("quota exceeded".into()))
    }
}

#[tokio::test]
async fn first_load_is_all_zero() {
    let service = open(Arc::new(InMemoryStore::new())).await;
    let stats = service.stats();

    assert_eq!(stats.overall, Completion::new(0, 7));
    assert_eq!(*stats.phase("soc").unwrap(), Completion::new(0, 4));
    assert_eq!(*stats.phase("hack").unwrap(), Completion::new(0, 3));
    assert_eq!(service.map().len(), 7);
}

#[tokio::test]
async fn toggling_two_soc_items() {
    let mut service = open(Arc::new(InMemoryStore::new())).await;
    service.toggle("soc-linux", true).await.unwrap();
    let stats = service.toggle("soc-siem", true).await.unwrap();

    assert_eq!(
        stats.overall,
        Completion {
            completed: 2,
            total: 7,
            percentage: 29
        }
    );
    assert_eq!(
        *stats.phase("soc").unwrap(),
        Completion {
            completed: 2,
            total: 4,
            percentage: 50
        }
    );
    assert_eq!(
        *stats.phase("hack").unwrap(),
        Completion {
            completed: 0,
            total: 3,
            percentage: 0
        }
    );
}

#[tokio::test]
async fn toggle_on_then_off_restores_stats() {
    let mut service = open(Arc::new(InMemoryStore::new())).await;
    service.toggle("hack-web", true).await.unwrap();
    let before = service.stats();

    service.toggle("soc-ir", true).await.unwrap();
    let after = service.toggle("soc-ir", false).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn progress_survives_a_new_session() {
    let store = InMemoryStore::new();
    let mut first = open(Arc::new(store.clone())).await;
    first.toggle("hack-recon", true).await.unwrap();

    let second = open(Arc::new(store)).await;
    assert!(second.is_completed("hack-recon"));
    assert_eq!(second.stats().overall.completed, 1);
}

#[tokio::test]
async fn reset_zeroes_everything_and_is_idempotent() {
    let store = InMemoryStore::new();
    let mut service = open(Arc::new(store.clone())).await;
    service.toggle("soc-linux", true).await.unwrap();
    service.toggle("hack-web", true).await.unwrap();

    let stats = service.reset().await;
    assert_eq!(stats.overall.completed, 0);
    assert_eq!(stats.overall.percentage, 0);
    assert!(stats.phases.iter().all(|p| p.completion.percentage == 0));

    let persisted = store.get(PROGRESS_KEY).await.unwrap().unwrap();
    let again = service.reset().await;
    assert_eq!(again, stats);
    assert_eq!(store.get(PROGRESS_KEY).await.unwrap().unwrap(), persisted);
}

#[tokio::test]
async fn export_import_round_trip_on_fresh_store() {
    let mut source = open(Arc::new(InMemoryStore::new())).await;
    source.toggle("soc-mitre", true).await.unwrap();
    source.toggle("hack-owasp", true).await.unwrap();
    let exported = source.export().unwrap();

    let mut target = open(Arc::new(InMemoryStore::new())).await;
    let stats = target.import(&exported).await.unwrap();

    assert_eq!(target.map(), source.map());
    assert_eq!(stats, source.stats());
    assert_eq!(target.export().unwrap(), exported);
}

#[tokio::test]
async fn round_trip_keeps_unknown_keys_and_false_values() {
    let snapshot = r#"{"foo-bar":true,"hack-web":false,"legacy item":false,"soc-ir":true}"#;
    let mut source = open(Arc::new(InMemoryStore::new())).await;
    source.import(snapshot).await.unwrap();
    let exported = source.export().unwrap();
    assert_eq!(exported, snapshot);

    let mut target = open(Arc::new(InMemoryStore::new())).await;
    let stats = target.import(&exported).await.unwrap();

    assert_eq!(target.map(), source.map());
    assert_eq!(target.map().len(), 4);
    assert_eq!(target.export().unwrap(), exported);
    assert_eq!(stats.overall, Completion::new(1, 7));
}

#[tokio::test]
async fn versioned_export_imports_too() {
    let mut source = open(Arc::new(InMemoryStore::new())).await;
    source.toggle("soc-ir", true).await.unwrap();
    let exported = source.export_versioned().unwrap();
    assert!(exported.starts_with(r#"{"version":1,"#));

    let mut target = open(Arc::new(InMemoryStore::new())).await;
    target.import(&exported).await.unwrap();
    assert_eq!(target.map(), source.map());
}

#[tokio::test]
async fn import_replaces_instead_of_merging() {
    let store = InMemoryStore::new();
    let mut service = open(Arc::new(store.clone())).await;
    service.toggle("soc-linux", true).await.unwrap();

    let stats = service.import(r#"{"hack-web":true}"#).await.unwrap();
    assert!(!service.is_completed("soc-linux"));
    assert!(service.is_completed("hack-web"));
    assert_eq!(stats.overall.completed, 1);
    assert_eq!(service.map().len(), 1);
    assert_eq!(
        store.get(PROGRESS_KEY).await.unwrap().as_deref(),
        Some(r#"{"hack-web":true}"#)
    );
}

#[tokio::test]
async fn malformed_import_leaves_state_untouched() {
    let store = InMemoryStore::new();
    let mut service = open(Arc::new(store.clone())).await;
    service.toggle("soc-siem", true).await.unwrap();
    let exported = service.export().unwrap();
    let persisted = store.get(PROGRESS_KEY).await.unwrap();
    let changes = service.subscribe();

    for bad in [
        "{oops",
        "[1,2]",
        r#"{"soc-ir":{"done":true}}"#,
        "\"text\"",
        r#"{"version":1,"items":{"hack-web":true},"soc-ir":true}"#,
    ] {
        let err = service.import(bad).await.unwrap_err();
        assert!(matches!(err, ProgressError::MalformedInput(_)), "{bad}");
    }

    assert_eq!(service.export().unwrap(), exported);
    assert_eq!(store.get(PROGRESS_KEY).await.unwrap(), persisted);
    assert!(!changes.has_changed().unwrap());
}

#[tokio::test]
async fn corrupt_stored_state_starts_fresh() {
    let store = InMemoryStore::new();
    store.set(PROGRESS_KEY, "{not json").await.unwrap();

    let service = open(Arc::new(store)).await;
    assert_eq!(service.stats().overall, Completion::new(0, 7));
    assert!(service.is_persistent());
}

#[tokio::test]
async fn nested_stored_value_keeps_the_rest_of_the_map() {
    let store = InMemoryStore::new();
    store
        .set(PROGRESS_KEY, r#"{"soc-linux":true,"soc-siem":["x"],"hack-web":false}"#)
        .await
        .unwrap();

    let service = open(Arc::new(store)).await;
    assert!(service.is_completed("soc-linux"));
    assert!(service.is_completed("soc-siem"));
    assert!(!service.is_completed("hack-web"));
    assert_eq!(service.stats().overall, Completion::new(2, 7));
}

#[tokio::test]
async fn unknown_stored_key_is_ignored_but_exported() {
    let store = InMemoryStore::new();
    store
        .set(PROGRESS_KEY, r#"{"foo-bar":true,"soc-linux":true}"#)
        .await
        .unwrap();

    let service = open(Arc::new(store)).await;
    let stats = service.stats();
    assert_eq!(stats.overall.completed, 1);
    assert!(stats.phases.iter().all(|p| p.completion.completed <= 1));
    assert!(service.export().unwrap().contains(r#""foo-bar":true"#));
}

#[tokio::test]
async fn unreadable_storage_degrades_to_memory() {
    let store = Arc::new(BrokenStore {
        fail_reads: true,
        ..BrokenStore::default()
    });
    let mut service = open(store.clone()).await;
    assert!(!service.is_persistent());

    let stats = service.toggle("soc-linux", true).await.unwrap();
    assert_eq!(stats.overall.completed, 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_write_is_not_fatal_and_not_retried() {
    let store = Arc::new(BrokenStore::default());
    let mut service = open(store.clone()).await;
    assert!(service.is_persistent());

    service.toggle("soc-linux", true).await.unwrap();
    assert!(!service.is_persistent());
    service.toggle("soc-siem", true).await.unwrap();
    service.import(r#"{"hack-web":true}"#).await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    assert!(service.is_completed("hack-web"));
}

#[tokio::test]
async fn import_notifies_subscribers() {
    let mut service = open(Arc::new(InMemoryStore::new())).await;
    let mut changes = service.subscribe();

    service
        .import(r#"{"soc-linux":true,"soc-siem":true}"#)
        .await
        .unwrap();
    changes.changed().await.unwrap();
    let change = changes.borrow_and_update().clone();
    assert_eq!(change.cause, ChangeCause::Imported);
    assert_eq!(change.stats.phase("soc").unwrap().percentage, 50);
}
