mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{FakeApi, FlakyStore, draft, draft_on, rejected, unreachable};
use spendsync::application::{ErrorKind, LocalStore, OfflineQueue};
use spendsync::domain::{Category, is_offline_id};
use spendsync::storage::{MemoryStore, SqliteStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_enqueue_preserves_insertion_order() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());

    let mut ids = Vec::new();
    for amount in [100, 200, 300, 400, 500] {
        ids.push(queue.enqueue(draft(amount)).await?.id);
    }

    let queued = queue.list_queued().await;
    assert_eq!(queued.len(), 5);
    assert_eq!(queued.iter().map(|e| e.id.clone()).collect::<Vec<_>>(), ids);
    assert_eq!(
        queued.iter().map(|e| e.draft.amount_cents).collect::<Vec<_>>(),
        vec![100, 200, 300, 400, 500]
    );
    assert!(queued.iter().all(|e| e.is_offline && is_offline_id(&e.id)));

    Ok(())
}

#[tokio::test]
async fn test_drain_twice_is_idempotent() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    let api = FakeApi::new();

    queue.enqueue(draft(100)).await?;
    queue.enqueue(draft(200)).await?;

    let first = queue.drain(&api).await?;
    assert_eq!(first.synced, 2);
    assert_eq!(first.remaining, 0);
    assert!(queue.is_empty().await);

    let second = queue.drain(&api).await?;
    assert_eq!(second.synced, 0);
    assert_eq!(second.remaining, 0);

    // Nothing was submitted twice
    assert_eq!(api.create_calls(), 2);
    assert_eq!(api.expenses().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_drain_isolates_partial_failure() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    let api = FakeApi::new();
    api.fail_call(2, unreachable());

    queue.enqueue(draft(100)).await?;
    let second = queue.enqueue(draft(200)).await?;
    queue.enqueue(draft(300)).await?;

    let report = queue.drain(&api).await?;
    assert_eq!(report.synced, 2);
    assert_eq!(report.remaining, 1);
    assert_eq!(report.rejected, 0);

    let left = queue.list_queued().await;
    assert_eq!(left, vec![second]);

    // Submitted in queue order, skipping the failed entry
    let amounts: Vec<_> = report
        .synced_expenses
        .iter()
        .map(|e| e.amount_cents)
        .collect();
    assert_eq!(amounts, vec![100, 300]);

    // The next pass picks the leftover up
    let retry = queue.drain(&api).await?;
    assert_eq!(retry.synced, 1);
    assert_eq!(retry.remaining, 0);

    Ok(())
}

#[tokio::test]
async fn test_server_rejections_stay_queued() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    let api = FakeApi::new();
    api.fail_call(1, rejected());
    api.fail_call(2, rejected());

    let entry = queue.enqueue(draft(100)).await?;

    let report = queue.drain(&api).await?;
    assert_eq!(report.synced, 0);
    assert_eq!(report.remaining, 1);
    assert_eq!(report.rejected, 1);

    // Retried on the next pass as well
    let again = queue.drain(&api).await?;
    assert_eq!(again.rejected, 1);
    assert_eq!(queue.list_queued().await, vec![entry]);

    Ok(())
}

#[tokio::test]
async fn test_drained_expense_keeps_draft_fields() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    let api = FakeApi::new();

    let original = draft_on(45050, Category::Education, "2024-05-20").with_description("exam fee");
    let queued = queue.enqueue(original.clone()).await?;

    queue.drain(&api).await?;

    assert_eq!(api.submitted(), vec![original.clone()]);

    let created = &api.expenses()[0];
    assert_ne!(created.id, queued.id);
    assert!(!is_offline_id(&created.id));
    assert_eq!(created.amount_cents, original.amount_cents);
    assert_eq!(created.category, original.category);
    assert_eq!(created.payment_method, original.payment_method);
    assert_eq!(created.description, original.description);
    assert_eq!(created.date, original.date);

    Ok(())
}

#[tokio::test]
async fn test_drain_with_all_failures_keeps_queue() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    let api = FakeApi::new();
    api.set_offline(true);

    queue.enqueue(draft(100)).await?;
    queue.enqueue(draft(200)).await?;
    let before = queue.list_queued().await;

    let report = queue.drain(&api).await?;
    assert_eq!(report.synced, 0);
    assert_eq!(report.remaining, 2);
    assert_eq!(queue.list_queued().await, before);

    Ok(())
}

#[tokio::test]
async fn test_enqueue_storage_failure_propagates() -> Result<()> {
    let store = FlakyStore::new();
    store.fail_writes(true);
    let queue = OfflineQueue::new(store);

    let err = queue.enqueue(draft(100)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);

    queue.store().fail_writes(false);
    assert!(queue.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_unreadable_store_lists_empty_but_drain_fails() -> Result<()> {
    let queue = OfflineQueue::new(FlakyStore::new());
    queue.enqueue(draft(100)).await?;

    queue.store().fail_reads(true);
    assert!(queue.list_queued().await.is_empty());

    let api = FakeApi::new();
    let err = queue.drain(&api).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert_eq!(api.create_calls(), 0);

    queue.store().fail_reads(false);
    assert_eq!(queue.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_drain_persist_failure_aborts() -> Result<()> {
    let queue = OfflineQueue::new(FlakyStore::new());
    queue.enqueue(draft(100)).await?;

    queue.store().fail_writes(true);
    let api = FakeApi::new();
    let err = queue.drain(&api).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);

    // The persisted queue was not touched
    queue.store().fail_writes(false);
    assert_eq!(queue.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_unparseable_queue_blocks_enqueue_and_drain() -> Result<()> {
    let queue = OfflineQueue::new(MemoryStore::new());
    queue.enqueue(draft(100)).await?;
    queue.enqueue(draft(200)).await?;

    let stored = queue
        .store()
        .read("offline_expenses")
        .await?
        .expect("queue written");
    let corrupt = stored.replacen("\"Food\"", "\"Groceries\"", 1);
    queue.store().write("offline_expenses", &corrupt).await?;

    let err = queue.enqueue(draft(300)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);

    let api = FakeApi::new();
    let err = queue.drain(&api).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFailure);
    assert_eq!(api.create_calls(), 0);

    // Both saved expenses are still on disk, untouched
    let after = queue.store().read("offline_expenses").await?;
    assert_eq!(after.as_deref(), Some(corrupt.as_str()));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enqueues_are_not_lost() -> Result<()> {
    let queue = Arc::new(OfflineQueue::new(MemoryStore::new()));

    let handles: Vec<_> = (1..=25)
        .map(|i| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.enqueue(draft(i * 100)).await })
        })
        .collect();

    for handle in handles {
        handle.await??;
    }

    assert_eq!(queue.len().await, 25);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enqueue_during_drain_survives() -> Result<()> {
    let queue = Arc::new(OfflineQueue::new(MemoryStore::new()));
    let api = Arc::new(FakeApi::new());

    for i in 1..=10 {
        queue.enqueue(draft(i * 100)).await?;
    }

    let drain = {
        let queue = Arc::clone(&queue);
        let api = Arc::clone(&api);
        tokio::spawn(async move { queue.drain(api.as_ref()).await })
    };
    let late = queue.enqueue(draft(9999)).await?;

    let report = drain.await??;
    let left = queue.list_queued().await;

    // Either the late entry was drained with the rest or it is still queued
    if report.synced == 11 {
        assert!(left.is_empty());
    } else {
        assert_eq!(report.synced, 10);
        assert_eq!(left, vec![late]);
    }
    assert_eq!(api.expenses().len(), report.synced);

    Ok(())
}

#[tokio::test]
async fn test_sqlite_queue_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("device.db");
    let db_path = db_path.to_str().unwrap();

    let queued = {
        let queue = OfflineQueue::new(SqliteStore::init(db_path).await?);
        queue.enqueue(draft(100)).await?;
        queue.enqueue(draft(200)).await?;
        queue.list_queued().await
    };

    let reopened = OfflineQueue::new(SqliteStore::init(db_path).await?);
    assert_eq!(reopened.list_queued().await, queued);

    let api = FakeApi::new();
    let report = reopened.drain(&api).await?;
    assert_eq!(report.synced, 2);

    let raw = reopened.store().read("offline_expenses").await?;
    assert_eq!(raw.as_deref(), Some("[]"));

    Ok(())
}
