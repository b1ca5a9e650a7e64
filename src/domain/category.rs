use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A classification tag for budgets. Carries no invariant-bearing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

impl Category {
    pub fn new(name: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            user_id,
        }
    }
}
