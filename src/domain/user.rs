use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account owner. Profile management lives outside this crate; the ledger
/// only needs identity and a display name for views and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }
}
