use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::DateRange;

/// An income source.
///
/// `amount_budgeted` is derived state: it always equals the sum of the
/// amounts of the budgets funded from this earning, and only the ledger
/// services mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Earning {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub general_amount: f64,
    pub amount_budgeted: f64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Earning {
    pub fn new(
        name: impl Into<String>,
        window: DateRange,
        general_amount: f64,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: window.start,
            end_date: window.end,
            general_amount,
            amount_budgeted: 0.0,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Income not yet committed to any budget.
    pub fn available_amount(&self) -> f64 {
        self.general_amount - self.amount_budgeted
    }
}
