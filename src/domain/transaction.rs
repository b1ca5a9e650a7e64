use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A debit posted against a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub budget_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(amount: f64, description: Option<String>, budget_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            description,
            budget_id,
            created_at: Utc::now(),
        }
    }
}
