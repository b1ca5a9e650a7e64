use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::DateRange;

/// A spending envelope funded by exactly one earning.
///
/// `amount` is the allocation taken from the earning; `amount_spent`
/// accumulates posted transactions and starts at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub amount_spent: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category_id: Uuid,
    pub earning_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        amount: f64,
        window: DateRange,
        category_id: Uuid,
        earning_id: Uuid,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            amount,
            amount_spent: 0.0,
            start_date: window.start,
            end_date: window.end,
            category_id,
            earning_id,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Share of the allocation already consumed, as a percentage.
    /// `None` when the allocation is zero or negative.
    pub fn spent_ratio(&self) -> Option<f64> {
        if self.amount > 0.0 {
            Some(self.amount_spent / self.amount * 100.0)
        } else {
            None
        }
    }
}
