// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use spendsync::application::{ApiError, ExpenseApi, LocalStore};
use spendsync::domain::{Category, Cents, Expense, ExpenseDraft, PaymentMethod, month_of};
use spendsync::storage::MemoryStore;

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

/// A valid draft dated on `date`
pub fn draft_on(amount_cents: Cents, category: Category, date: &str) -> ExpenseDraft {
    ExpenseDraft::new(amount_cents, category, PaymentMethod::Upi, parse_date(date))
}

pub fn draft(amount_cents: Cents) -> ExpenseDraft {
    ExpenseDraft::new(amount_cents, Category::Food, PaymentMethod::Cash, Utc::now())
}

#[derive(Default)]
struct FakeState {
    expenses: Vec<Expense>,
    submitted: Vec<ExpenseDraft>,
    next_id: u64,
    create_calls: usize,
    failures: HashMap<usize, ApiError>,
    offline: bool,
    listing_failure: Option<ApiError>,
}

/// In-memory stand-in for the remote expense API.
/// Individual `create_expense` calls can be scripted to fail by their 1-based index.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Make every `list_expenses` call fail while creates keep working.
    pub fn fail_listing(&self, err: ApiError) {
        self.state.lock().unwrap().listing_failure = Some(err);
    }

    /// Make the `call`-th create call (counting from 1, across the API's lifetime) fail.
    pub fn fail_call(&self, call: usize, err: ApiError) {
        self.state.lock().unwrap().failures.insert(call, err);
    }

    /// Seed an expense that already exists on the server.
    pub fn seed(&self, id: &str, draft: ExpenseDraft) {
        let created_at = draft.date;
        self.state
            .lock()
            .unwrap()
            .expenses
            .push(Expense::from_draft(id, draft, created_at));
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state.lock().unwrap().expenses.clone()
    }

    /// Drafts the server accepted, in order
    pub fn submitted(&self) -> Vec<ExpenseDraft> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }
}

pub fn unreachable() -> ApiError {
    ApiError::NetworkUnreachable("connection refused".into())
}

pub fn rejected() -> ApiError {
    ApiError::ServerRejected {
        status: 400,
        message: "Invalid expense".into(),
    }
}

impl ExpenseApi for FakeApi {
    async fn create_expense(&self, draft: &ExpenseDraft) -> Result<Expense, ApiError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        state.create_calls += 1;
        if let Some(err) = state.failures.remove(&state.create_calls) {
            return Err(err);
        }
        if state.offline {
            return Err(unreachable());
        }

        state.next_id += 1;
        let id = format!("srv_{}", state.next_id);
        let expense = Expense::from_draft(id, draft.clone(), Utc::now());
        state.submitted.push(draft.clone());
        state.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn list_expenses(&self, year: i32, month: u32) -> Result<Vec<Expense>, ApiError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.listing_failure {
            return Err(err.clone());
        }
        if state.offline {
            return Err(unreachable());
        }
        Ok(state
            .expenses
            .iter()
            .filter(|e| month_of(e.date) == (year, month))
            .cloned()
            .collect())
    }
}

/// Memory-backed store whose reads and writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl LocalStore for FlakyStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("device storage unavailable");
        }
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("device storage full");
        }
        self.inner.write(key, value).await
    }
}
