//! Posting transactions against budgets.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Budget, Transaction};
use crate::errors::{LedgerError, LedgerResult};
use crate::money::{parse_money, Locale, MoneyInput};
use crate::store::{RecordStore, WriteBatch, WriteOp};

use super::views::TransactionView;

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub amount: MoneyInput,
    pub description: Option<String>,
    pub budget_id: Uuid,
}

pub struct TransactionService {
    store: Arc<dyn RecordStore>,
    locale: Locale,
}

impl TransactionService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Posts a debit against a budget: the transaction row and the budget's
    /// `amount_spent` increment land in one unit of work.
    pub fn create(
        &self,
        input: CreateTransactionInput,
        user_id: Uuid,
    ) -> LedgerResult<TransactionView> {
        let amount = parse_money(&input.amount)?;
        let budget = self.require_budget(input.budget_id)?;
        if budget.user_id != user_id {
            return Err(LedgerError::Unauthorized {
                entity: "budget",
                id: budget.id,
                user_id,
            });
        }

        let txn = Transaction::new(amount, input.description, budget.id);
        let batch = WriteBatch::new()
            .with(WriteOp::AdjustBudgetSpent {
                id: budget.id,
                delta: amount,
            })
            .with(WriteOp::SaveTransaction(txn.clone()));
        self.store.apply(batch)?;
        info!(transaction = %txn.id, budget = %budget.id, amount, "transaction posted");

        let budget = self.require_budget(budget.id)?;
        Ok(TransactionView::assemble(&txn, &budget, &self.locale))
    }

    /// Lists every transaction posted against the user's budgets.
    ///
    /// An empty result is reported as `NotFound` — a quirk of the producer
    /// contract, not a general convention of this crate.
    pub fn list_for_user(&self, user_id: Uuid) -> LedgerResult<Vec<TransactionView>> {
        self.store
            .user(user_id)?
            .ok_or_else(|| LedgerError::not_found("user", user_id))?;
        let budgets: HashMap<Uuid, Budget> = self
            .store
            .budgets_for_user(user_id)?
            .into_iter()
            .map(|budget| (budget.id, budget))
            .collect();
        let views: Vec<TransactionView> = self
            .store
            .transactions()?
            .iter()
            .filter_map(|txn| {
                budgets
                    .get(&txn.budget_id)
                    .map(|budget| TransactionView::assemble(txn, budget, &self.locale))
            })
            .collect();
        if views.is_empty() {
            return Err(LedgerError::not_found("transactions for user", user_id));
        }
        Ok(views)
    }

    pub fn get(&self, id: Uuid) -> LedgerResult<TransactionView> {
        let txn = self
            .store
            .transaction(id)?
            .ok_or_else(|| LedgerError::not_found("transaction", id))?;
        let budget = self.require_budget(txn.budget_id)?;
        Ok(TransactionView::assemble(&txn, &budget, &self.locale))
    }

    fn require_budget(&self, id: Uuid) -> LedgerResult<Budget> {
        self.store
            .budget(id)?
            .ok_or_else(|| LedgerError::not_found("budget", id))
    }
}
