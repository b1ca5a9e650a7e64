//! Record-store boundary consumed by the ledger services.
//!
//! The trait mirrors what the services actually need: point reads, simple
//! scans, and an atomic multi-write unit of work. The adjust ops exist so
//! concurrent allocation changes serialize inside the store instead of racing
//! through read-modify-write cycles in service memory.

pub mod memory;

pub use memory::MemoryStore;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Budget, Category, Earning, Transaction, User};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Missing record: {0}")]
    MissingRecord(String),
}

/// A single mutation inside a unit of work.
#[derive(Debug, Clone)]
pub enum WriteOp {
    SaveEarning(Earning),
    SaveBudget(Budget),
    SaveTransaction(Transaction),
    DeleteBudget(Uuid),
    DeleteEarning(Uuid),
    /// Applies `delta` to the earning's `amount_budgeted` under the store's
    /// lock.
    AdjustEarningBudgeted { id: Uuid, delta: f64 },
    /// Applies `delta` to the budget's `amount_spent` under the store's lock.
    AdjustBudgetSpent { id: Uuid, delta: f64 },
}

/// An all-or-nothing batch of writes.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn with(mut self, op: WriteOp) -> Self {
        self.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Generic CRUD and query surface over the tracker's records.
pub trait RecordStore: Send + Sync {
    fn user(&self, id: Uuid) -> StoreResult<Option<User>>;
    fn category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    fn earning(&self, id: Uuid) -> StoreResult<Option<Earning>>;
    fn budget(&self, id: Uuid) -> StoreResult<Option<Budget>>;
    fn transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>>;

    fn budgets(&self) -> StoreResult<Vec<Budget>>;
    fn budgets_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Budget>>;
    fn budgets_for_earning(&self, earning_id: Uuid) -> StoreResult<Vec<Budget>>;
    fn earnings_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Earning>>;
    fn transactions(&self) -> StoreResult<Vec<Transaction>>;

    fn insert_user(&self, user: User) -> StoreResult<()>;
    fn insert_category(&self, category: Category) -> StoreResult<()>;

    /// Applies the batch atomically: either every op lands or none do.
    fn apply(&self, batch: WriteBatch) -> StoreResult<()>;
}
