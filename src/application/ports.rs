use std::future::Future;

use anyhow::Result;

use crate::domain::{Expense, ExpenseDraft};

use super::ApiError;

/// The remote expense API. Implemented by the app's HTTP client.
pub trait ExpenseApi: Send + Sync {
    /// Submit a new expense; the server assigns its identifier.
    fn create_expense(
        &self,
        draft: &ExpenseDraft,
    ) -> impl Future<Output = Result<Expense, ApiError>> + Send;

    /// List the user's expenses dated within a calendar month.
    fn list_expenses(
        &self,
        year: i32,
        month: u32,
    ) -> impl Future<Output = Result<Vec<Expense>, ApiError>> + Send;
}

/// A durable string key-value store on the device.
pub trait LocalStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn write(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}
