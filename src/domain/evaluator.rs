use serde::{Deserialize, Serialize};

use super::{Cents, format_cents};

/// Cut-off points for budget warnings.
///
/// `almost_exhausted_ratio` and `running_low_ratio` are fractions of the ceiling.
/// `alert_percentage` is compared against the percentage used on a 0-100 scale.
/// Its default of `0.75` is the value shipped so far, which raises an alert for
/// any spend above 0.75% of the ceiling. [`BudgetThresholds::intended`] uses 75.0
/// instead; which of the two the product wants is still open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetThresholds {
    pub almost_exhausted_ratio: f64,
    pub running_low_ratio: f64,
    pub alert_percentage: f64,
}

impl Default for BudgetThresholds {
    fn default() -> Self {
        Self {
            almost_exhausted_ratio: 0.05,
            running_low_ratio: 0.10,
            alert_percentage: 0.75,
        }
    }
}

impl BudgetThresholds {
    /// Alert once three quarters of the budget is spent.
    pub fn intended() -> Self {
        Self {
            alert_percentage: 75.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningTier {
    OverBudget,
    AlmostExhausted,
    RunningLow,
    Alert,
}

impl WarningTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningTier::OverBudget => "over_budget",
            WarningTier::AlmostExhausted => "almost_exhausted",
            WarningTier::RunningLow => "running_low",
            WarningTier::Alert => "alert",
        }
    }
}

impl std::fmt::Display for WarningTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of comparing a month's spending against its budget. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetWarning {
    pub tier: WarningTier,
    pub message: String,
    pub is_over_budget: bool,
    /// Ceiling minus total; negative once over budget
    pub remaining: Cents,
    /// Unrounded, on a 0-100 scale
    pub percentage_used: f64,
}

/// Classify `total` spend against `ceiling` using the default thresholds.
pub fn evaluate(total: Cents, ceiling: Cents) -> Option<BudgetWarning> {
    evaluate_with(total, ceiling, &BudgetThresholds::default())
}

/// Classify `total` spend against `ceiling`. Tiers are checked in order and
/// the first match wins.
pub fn evaluate_with(
    total: Cents,
    ceiling: Cents,
    thresholds: &BudgetThresholds,
) -> Option<BudgetWarning> {
    let remaining = ceiling.saturating_sub(total);
    let percentage_used = percentage_used(total, ceiling);
    let ceiling_f = ceiling as f64;

    let (tier, message) = if total > ceiling {
        (
            WarningTier::OverBudget,
            format!(
                "Budget exceeded by {}",
                format_cents(remaining.saturating_neg())
            ),
        )
    } else if (remaining as f64) < ceiling_f * thresholds.almost_exhausted_ratio {
        (
            WarningTier::AlmostExhausted,
            format!(
                "Budget almost exhausted: only {} left",
                format_cents(remaining)
            ),
        )
    } else if (remaining as f64) < ceiling_f * thresholds.running_low_ratio {
        (
            WarningTier::RunningLow,
            format!("Running low on budget: {} left", format_cents(remaining)),
        )
    } else if percentage_used >= thresholds.alert_percentage {
        (
            WarningTier::Alert,
            format!(
                "You have used {:.1}% of your monthly budget",
                percentage_used
            ),
        )
    } else {
        return None;
    };

    Some(BudgetWarning {
        tier,
        message,
        is_over_budget: tier == WarningTier::OverBudget,
        remaining,
        percentage_used,
    })
}

/// Spend as a percentage of the ceiling. A zero ceiling counts as fully used
/// once anything is spent.
pub fn percentage_used(total: Cents, ceiling: Cents) -> f64 {
    if ceiling > 0 {
        total as f64 * 100.0 / ceiling as f64
    } else if total > 0 {
        100.0
    } else {
        0.0
    }
}
