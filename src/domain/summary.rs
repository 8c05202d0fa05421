use std::collections::HashMap;

use serde::Serialize;

use super::{
    Budget, BudgetThresholds, BudgetWarning, Category, Cents, ExpenseView, ValidationError,
    evaluate_with, month_bounds,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: Cents,
    pub count: usize,
    /// Share of the month's total, on a 0-100 scale
    pub percentage: f64,
}

/// Spending for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total: Cents,
    pub count: usize,
    /// How many of the counted expenses are still waiting to sync
    pub pending_count: usize,
    pub categories: Vec<CategorySummary>,
    pub budget: Option<Cents>,
    pub remaining: Option<Cents>,
    pub warning: Option<BudgetWarning>,
}

impl MonthlySummary {
    /// Aggregate the expenses dated inside the month; others are ignored.
    /// A budget for a different month is ignored as well.
    pub fn build(
        year: i32,
        month: u32,
        expenses: &[ExpenseView],
        budget: Option<&Budget>,
        thresholds: &BudgetThresholds,
    ) -> Result<Self, ValidationError> {
        let (start, end) = month_bounds(year, month)?;

        let mut by_category: HashMap<Category, (Cents, usize)> = HashMap::new();
        let mut total: Cents = 0;
        let mut count = 0;
        let mut pending_count = 0;

        for expense in expenses
            .iter()
            .filter(|e| e.date() >= start && e.date() < end)
        {
            let entry = by_category.entry(expense.category()).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(expense.amount_cents());
            entry.1 += 1;
            total = total.saturating_add(expense.amount_cents());
            count += 1;
            if expense.is_offline() {
                pending_count += 1;
            }
        }

        let mut categories: Vec<CategorySummary> = by_category
            .into_iter()
            .map(|(category, (cat_total, cat_count))| CategorySummary {
                category,
                total: cat_total,
                count: cat_count,
                percentage: if total > 0 {
                    cat_total as f64 * 100.0 / total as f64
                } else {
                    0.0
                },
            })
            .collect();
        categories.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });

        let budget = budget.filter(|b| b.year() == year && b.month() == month);
        let ceiling = budget.map(Budget::amount_cents);

        Ok(Self {
            year,
            month,
            total,
            count,
            pending_count,
            categories,
            budget: ceiling,
            remaining: ceiling.map(|c| c.saturating_sub(total)),
            warning: ceiling.and_then(|c| evaluate_with(total, c, thresholds)),
        })
    }
}
