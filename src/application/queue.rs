use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Expense, ExpenseDraft, OfflineExpense};

use super::{ApiError, AppError, ExpenseApi, LocalStore};

/// Store key holding the serialized queue.
pub const DEFAULT_QUEUE_KEY: &str = "offline_expenses";

/// Outcome of one pass over the offline queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub synced: usize,
    pub remaining: usize,
    /// Entries left queued because the server refused them rather than
    /// because it was unreachable. They are retried like any other entry.
    pub rejected: usize,
    /// Server records created during this pass, in queue order
    pub synced_expenses: Vec<Expense>,
}

/// Durable, ordered queue of expenses that could not reach the server.
///
/// The whole queue lives in a single document of the local store. Every
/// read-modify-write (`enqueue`, `drain`, `clear`) holds `lock` from the read
/// to the write, so two of them never interleave their persist steps.
pub struct OfflineQueue<S> {
    store: S,
    key: String,
    lock: Mutex<()>,
}

impl<S: LocalStore> OfflineQueue<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_QUEUE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append a draft to the queue under a fresh temporary identifier.
    /// The draft is expected to be validated already. A stored queue that
    /// cannot be parsed is never overwritten.
    pub async fn enqueue(&self, draft: ExpenseDraft) -> Result<OfflineExpense, AppError> {
        let _guard = self.lock.lock().await;

        let mut queue = self.load().await?;
        let entry = OfflineExpense::from_draft(draft, Utc::now());
        queue.push(entry.clone());
        self.persist(&queue).await?;

        info!("Queued offline expense {} ({} pending)", entry.id, queue.len());
        Ok(entry)
    }

    /// Queued expenses in insertion order.
    /// A missing or unreadable queue is reported as empty.
    pub async fn list_queued(&self) -> Vec<OfflineExpense> {
        match self.load().await {
            Ok(queue) => queue,
            Err(e) => {
                warn!("Could not read offline queue, treating it as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.list_queued().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Submit every queued expense in order, keeping only the ones that fail.
    ///
    /// A failing entry never stops the pass. Only local storage errors abort
    /// it, in which case the persisted queue is left as it was.
    pub async fn drain<A: ExpenseApi>(&self, api: &A) -> Result<DrainReport, AppError> {
        let _guard = self.lock.lock().await;

        let queue = self.load().await?;
        if queue.is_empty() {
            return Ok(DrainReport::default());
        }

        debug!("Draining {} offline expenses", queue.len());

        let mut report = DrainReport::default();
        let mut still_pending = Vec::new();

        for entry in queue {
            match api.create_expense(&entry.to_draft()).await {
                Ok(expense) => {
                    debug!("Synced offline expense {} as {}", entry.id, expense.id);
                    report.synced += 1;
                    report.synced_expenses.push(expense);
                }
                Err(err) => {
                    // TODO: drop or park entries the server keeps rejecting once
                    // product decides what should happen to them.
                    if matches!(err, ApiError::ServerRejected { .. }) {
                        report.rejected += 1;
                    }
                    warn!("Offline expense {} not synced: {}", entry.id, err);
                    still_pending.push(entry);
                }
            }
        }

        report.remaining = still_pending.len();
        if report.synced > 0 {
            self.persist(&still_pending).await?;
        }

        info!(
            "Offline sync finished: {} synced, {} remaining",
            report.synced, report.remaining
        );
        Ok(report)
    }

    /// Drop every queued expense.
    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        self.persist(&[]).await?;
        info!("Offline queue cleared");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<OfflineExpense>, AppError> {
        let Some(raw) = self.store.read(&self.key).await? else {
            return Ok(Vec::new());
        };

        Ok(serde_json::from_str(&raw)?)
    }

    async fn persist(&self, queue: &[OfflineExpense]) -> Result<(), AppError> {
        let raw = serde_json::to_string(queue)?;
        self.store.write(&self.key, &raw).await?;
        Ok(())
    }
}
