use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error taxonomy shared by every ledger operation.
///
/// Reference-resolution and validation failures surface before any write;
/// `Persistence` means an atomic unit of work failed and was rolled back.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("user {user_id} is not the owner of {entity} {id}")]
    Unauthorized {
        entity: &'static str,
        id: Uuid,
        user_id: Uuid,
    },
    #[error("cannot parse `{0}` as a monetary amount")]
    InvalidAmount(String),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("earning {0} still has linked budgets")]
    EarningInUse(Uuid),
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
