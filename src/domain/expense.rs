use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ValidationError};

/// Marker prefix carried by identifiers of expenses that never reached the server.
pub const OFFLINE_ID_PREFIX: &str = "offline_";

/// Upper bound on the free-text description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "UPI")]
    Upi,
    Online,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::Online,
        PaymentMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Online => "Online",
            PaymentMethod::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense as entered by the user, before the server has assigned an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount_cents: Cents,
    pub category: Category,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the expense happened
    pub date: DateTime<Utc>,
}

impl ExpenseDraft {
    pub fn new(
        amount_cents: Cents,
        category: Category,
        payment_method: PaymentMethod,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            amount_cents,
            category,
            payment_method,
            description: None,
            date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the draft and normalise its description.
    /// Blank descriptions become `None`, others are trimmed.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount(self.amount_cents));
        }

        self.description = match self.description.take() {
            Some(desc) => {
                let trimmed = desc.trim();
                if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
                    return Err(ValidationError::DescriptionTooLong {
                        max: MAX_DESCRIPTION_LEN,
                    });
                }
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            None => None,
        };

        Ok(())
    }
}

/// An expense the server has accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount_cents: Cents,
    pub category: Category,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Build the server-side record for an accepted draft.
    pub fn from_draft(
        id: impl Into<String>,
        draft: ExpenseDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount_cents: draft.amount_cents,
            category: draft.category,
            payment_method: draft.payment_method,
            description: draft.description,
            date: draft.date,
            created_at,
        }
    }
}

/// An expense waiting in the local queue for the server to come back.
/// Never mutated in place: it is either drained or left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineExpense {
    /// Temporary identifier, always starting with [`OFFLINE_ID_PREFIX`]
    pub id: String,
    #[serde(flatten)]
    pub draft: ExpenseDraft,
    pub is_offline: bool,
    pub created_at: DateTime<Utc>,
}

impl OfflineExpense {
    pub fn from_draft(draft: ExpenseDraft, now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!(
                "{}{}_{}",
                OFFLINE_ID_PREFIX,
                now.timestamp_millis(),
                &suffix[..8]
            ),
            draft,
            is_offline: true,
            created_at: now,
        }
    }

    /// The payload to submit once connectivity returns.
    pub fn to_draft(&self) -> ExpenseDraft {
        self.draft.clone()
    }
}

pub fn is_offline_id(id: &str) -> bool {
    id.starts_with(OFFLINE_ID_PREFIX)
}

/// An expense as the UI lists it: either confirmed by the server or still queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseView {
    Synced(Expense),
    Pending(OfflineExpense),
}

impl ExpenseView {
    pub fn id(&self) -> &str {
        match self {
            ExpenseView::Synced(e) => &e.id,
            ExpenseView::Pending(o) => &o.id,
        }
    }

    pub fn amount_cents(&self) -> Cents {
        match self {
            ExpenseView::Synced(e) => e.amount_cents,
            ExpenseView::Pending(o) => o.draft.amount_cents,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ExpenseView::Synced(e) => e.category,
            ExpenseView::Pending(o) => o.draft.category,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            ExpenseView::Synced(e) => e.date,
            ExpenseView::Pending(o) => o.draft.date,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, ExpenseView::Pending(_))
    }
}
