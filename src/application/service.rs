use tracing::{info, warn};

use crate::domain::{
    Budget, BudgetThresholds, BudgetWarning, Cents, Expense, ExpenseDraft, ExpenseView,
    MonthlySummary, OfflineExpense, evaluate_with, month_bounds,
};

use super::{ApiError, AppError, DrainReport, ExpenseApi, LocalStore, OfflineQueue};

/// What happened to a newly added expense.
#[derive(Debug, Clone, PartialEq)]
pub enum AddExpenseOutcome {
    /// The server accepted it. `warning` is set when the month's spending
    /// crossed one of the budget thresholds.
    Created {
        expense: Expense,
        warning: Option<BudgetWarning>,
    },
    /// The server was unreachable; the expense waits in the offline queue.
    SavedOffline(OfflineExpense),
}

/// Application service tying the remote API, the offline queue and the budget
/// evaluator together. This is the entry point for the UI layer.
///
/// The service keeps no state between calls besides what lives in the local
/// store and on the server.
pub struct ExpenseService<A, S> {
    api: A,
    queue: OfflineQueue<S>,
    thresholds: BudgetThresholds,
}

impl<A: ExpenseApi, S: LocalStore> ExpenseService<A, S> {
    pub fn new(api: A, queue: OfflineQueue<S>) -> Self {
        Self {
            api,
            queue,
            thresholds: BudgetThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: BudgetThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn queue(&self) -> &OfflineQueue<S> {
        &self.queue
    }

    // ========================
    // Expense creation
    // ========================

    /// Validate and submit an expense.
    ///
    /// Invalid drafts are rejected before anything is sent or queued. When the
    /// server cannot be reached the expense is queued offline instead; when the
    /// server refuses it, the error is returned and nothing is queued.
    pub async fn add_expense(
        &self,
        mut draft: ExpenseDraft,
        budget: Option<&Budget>,
    ) -> Result<AddExpenseOutcome, AppError> {
        draft.validate()?;

        match self.api.create_expense(&draft).await {
            Ok(expense) => {
                info!("Expense {} created", expense.id);
                let warning = match budget {
                    Some(budget) => self.check_budget(&expense, budget).await,
                    None => None,
                };
                Ok(AddExpenseOutcome::Created { expense, warning })
            }
            Err(ApiError::NetworkUnreachable(reason)) => {
                info!("Server unreachable ({}), saving expense offline", reason);
                let entry = self.queue.enqueue(draft).await?;
                Ok(AddExpenseOutcome::SavedOffline(entry))
            }
            Err(err) => {
                warn!("Expense rejected: {}", err);
                Err(err.into())
            }
        }
    }

    /// Evaluate the budget after `expense` was created. Returns `None` when
    /// the expense is outside the budget's month or the month's expenses
    /// cannot be fetched.
    async fn check_budget(&self, expense: &Expense, budget: &Budget) -> Option<BudgetWarning> {
        if !budget.contains(expense.date) {
            return None;
        }

        let existing = match self.api.list_expenses(budget.year(), budget.month()).await {
            Ok(expenses) => expenses,
            Err(e) => {
                warn!("Skipping budget check, could not list expenses: {}", e);
                return None;
            }
        };

        // The listing may or may not include the new expense already
        let total: Cents = existing
            .iter()
            .filter(|e| e.id != expense.id && budget.contains(e.date))
            .fold(expense.amount_cents, |acc, e| acc.saturating_add(e.amount_cents));

        let warning = evaluate_with(total, budget.amount_cents(), &self.thresholds);
        if let Some(w) = &warning {
            info!("Budget warning ({}): {}", w.tier, w.message);
        }
        warning
    }

    // ========================
    // Offline sync
    // ========================

    /// Push queued offline expenses to the server. Call on app start and
    /// whenever connectivity comes back.
    pub async fn sync(&self) -> Result<DrainReport, AppError> {
        self.queue.drain(&self.api).await
    }

    pub async fn queued(&self) -> Vec<OfflineExpense> {
        self.queue.list_queued().await
    }

    // ========================
    // Listing and summaries
    // ========================

    /// Expenses of a month as the UI shows them: server records plus queued
    /// offline ones, newest first. Without a connection only the queued ones
    /// are returned.
    pub async fn month_expenses(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<ExpenseView>, AppError> {
        let (start, end) = month_bounds(year, month)?;

        let mut views: Vec<ExpenseView> = match self.api.list_expenses(year, month).await {
            Ok(expenses) => expenses.into_iter().map(ExpenseView::Synced).collect(),
            Err(ApiError::NetworkUnreachable(reason)) => {
                warn!("Showing offline expenses only: {}", reason);
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        views.extend(
            self.queue
                .list_queued()
                .await
                .into_iter()
                .filter(|o| o.draft.date >= start && o.draft.date < end)
                .map(ExpenseView::Pending),
        );
        views.sort_by(|a, b| b.date().cmp(&a.date()));

        Ok(views)
    }

    pub async fn monthly_summary(
        &self,
        year: i32,
        month: u32,
        budget: Option<&Budget>,
    ) -> Result<MonthlySummary, AppError> {
        let expenses = self.month_expenses(year, month).await?;
        Ok(MonthlySummary::build(
            year,
            month,
            &expenses,
            budget,
            &self.thresholds,
        )?)
    }
}
