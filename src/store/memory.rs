//! In-memory record store with JSON snapshot persistence.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Budget, Category, Earning, Transaction, User};

use super::{RecordStore, StoreError, StoreResult, WriteBatch, WriteOp};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    users: HashMap<Uuid, User>,
    #[serde(default)]
    categories: HashMap<Uuid, Category>,
    #[serde(default)]
    earnings: HashMap<Uuid, Earning>,
    #[serde(default)]
    budgets: HashMap<Uuid, Budget>,
    #[serde(default)]
    transactions: HashMap<Uuid, Transaction>,
}

/// Mutex-guarded table store.
///
/// Batches commit by staging every op against a copy of the tables and
/// swapping the copy in, so a failing op leaves nothing behind. All reads and
/// writes funnel through the one lock, which is what serializes concurrent
/// allocation adjustments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().expect("record store mutex poisoned")
    }

    /// Writes the current tables to disk, staging to a temporary file first.
    pub fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&*self.tables())?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Loads a store from a snapshot file.
    pub fn load_snapshot(path: &Path) -> StoreResult<Self> {
        let data = fs::read_to_string(path)?;
        let tables = serde_json::from_str(&data)?;
        Ok(Self {
            inner: Mutex::new(tables),
        })
    }
}

impl RecordStore for MemoryStore {
    fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    fn category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables().categories.get(&id).cloned())
    }

    fn earning(&self, id: Uuid) -> StoreResult<Option<Earning>> {
        Ok(self.tables().earnings.get(&id).cloned())
    }

    fn budget(&self, id: Uuid) -> StoreResult<Option<Budget>> {
        Ok(self.tables().budgets.get(&id).cloned())
    }

    fn transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.tables().transactions.get(&id).cloned())
    }

    fn budgets(&self) -> StoreResult<Vec<Budget>> {
        Ok(self.tables().budgets.values().cloned().collect())
    }

    fn budgets_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        Ok(self
            .tables()
            .budgets
            .values()
            .filter(|budget| budget.user_id == user_id)
            .cloned()
            .collect())
    }

    fn budgets_for_earning(&self, earning_id: Uuid) -> StoreResult<Vec<Budget>> {
        Ok(self
            .tables()
            .budgets
            .values()
            .filter(|budget| budget.earning_id == earning_id)
            .cloned()
            .collect())
    }

    fn earnings_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Earning>> {
        Ok(self
            .tables()
            .earnings
            .values()
            .filter(|earning| earning.user_id == user_id)
            .cloned()
            .collect())
    }

    fn transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.tables().transactions.values().cloned().collect())
    }

    fn insert_user(&self, user: User) -> StoreResult<()> {
        self.tables().users.insert(user.id, user);
        Ok(())
    }

    fn insert_category(&self, category: Category) -> StoreResult<()> {
        self.tables().categories.insert(category.id, category);
        Ok(())
    }

    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut guard = self.tables();
        let mut staged = guard.clone();
        for op in batch.ops() {
            match op {
                WriteOp::SaveEarning(earning) => {
                    staged.earnings.insert(earning.id, earning.clone());
                }
                WriteOp::SaveBudget(budget) => {
                    staged.budgets.insert(budget.id, budget.clone());
                }
                WriteOp::SaveTransaction(txn) => {
                    staged.transactions.insert(txn.id, txn.clone());
                }
                WriteOp::DeleteBudget(id) => {
                    staged
                        .budgets
                        .remove(id)
                        .ok_or_else(|| StoreError::MissingRecord(format!("budget {id}")))?;
                }
                WriteOp::DeleteEarning(id) => {
                    staged
                        .earnings
                        .remove(id)
                        .ok_or_else(|| StoreError::MissingRecord(format!("earning {id}")))?;
                }
                WriteOp::AdjustEarningBudgeted { id, delta } => {
                    let earning = staged
                        .earnings
                        .get_mut(id)
                        .ok_or_else(|| StoreError::MissingRecord(format!("earning {id}")))?;
                    earning.amount_budgeted += delta;
                }
                WriteOp::AdjustBudgetSpent { id, delta } => {
                    let budget = staged
                        .budgets
                        .get_mut(id)
                        .ok_or_else(|| StoreError::MissingRecord(format!("budget {id}")))?;
                    budget.amount_spent += delta;
                }
            }
        }
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::validate_range;
    use chrono::NaiveDate;

    fn sample_earning(user_id: Uuid) -> Earning {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let window = validate_range(start, None).unwrap();
        Earning::new("Salary", window, 1_000_000.0, user_id)
    }

    #[test]
    fn a_failing_op_rolls_back_the_whole_batch() {
        let store = MemoryStore::new();
        let user = User::new("Dana", "dana@example.com");
        store.insert_user(user.clone()).unwrap();
        let earning = sample_earning(user.id);
        store
            .apply(WriteBatch::new().with(WriteOp::SaveEarning(earning.clone())))
            .unwrap();

        let batch = WriteBatch::new()
            .with(WriteOp::AdjustEarningBudgeted {
                id: earning.id,
                delta: 400_000.0,
            })
            .with(WriteOp::DeleteBudget(Uuid::new_v4()));
        let err = store.apply(batch).unwrap_err();
        assert!(matches!(err, StoreError::MissingRecord(_)));

        let stored = store.earning(earning.id).unwrap().unwrap();
        assert_eq!(stored.amount_budgeted, 0.0);
    }

    #[test]
    fn adjust_ops_accumulate_under_the_lock() {
        let store = MemoryStore::new();
        let user = User::new("Dana", "dana@example.com");
        let earning = sample_earning(user.id);
        store
            .apply(WriteBatch::new().with(WriteOp::SaveEarning(earning.clone())))
            .unwrap();
        for _ in 0..4 {
            store
                .apply(WriteBatch::new().with(WriteOp::AdjustEarningBudgeted {
                    id: earning.id,
                    delta: 100_000.0,
                }))
                .unwrap();
        }
        let stored = store.earning(earning.id).unwrap().unwrap();
        assert_eq!(stored.amount_budgeted, 400_000.0);
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let store = MemoryStore::new();
        let user = User::new("Dana", "dana@example.com");
        store.insert_user(user.clone()).unwrap();
        let earning = sample_earning(user.id);
        store
            .apply(WriteBatch::new().with(WriteOp::SaveEarning(earning.clone())))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        store.save_snapshot(&path).unwrap();

        let restored = MemoryStore::load_snapshot(&path).unwrap();
        let stored = restored.earning(earning.id).unwrap().unwrap();
        assert_eq!(stored.name, "Salary");
        assert!(restored.user(user.id).unwrap().is_some());
    }
}
