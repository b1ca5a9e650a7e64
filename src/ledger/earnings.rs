//! Earning operations.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::dates::validate_range;
use crate::domain::{Earning, User};
use crate::errors::{LedgerError, LedgerResult};
use crate::money::{parse_money, Locale, MoneyInput};
use crate::notify::{Clock, SystemClock};
use crate::store::{RecordStore, WriteBatch, WriteOp};

use super::views::EarningView;

/// Fields accepted when recording an income source.
#[derive(Debug, Clone)]
pub struct CreateEarningInput {
    pub name: String,
    pub general_amount: MoneyInput,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub struct EarningService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    locale: Locale,
}

impl EarningService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            locale: Locale::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Records a new income source with nothing budgeted yet.
    pub fn create(&self, input: CreateEarningInput, user_id: Uuid) -> LedgerResult<EarningView> {
        let user = self.require_user(user_id)?;
        let general_amount = parse_money(&input.general_amount)?;
        let start = input.start_date.unwrap_or_else(|| self.clock.today());
        let window = validate_range(start, input.end_date)?;

        let earning = Earning::new(input.name, window, general_amount, user.id);
        self.store
            .apply(WriteBatch::new().with(WriteOp::SaveEarning(earning.clone())))?;
        info!(earning = %earning.id, general_amount, "earning recorded");
        Ok(EarningView::assemble(&earning, &self.locale))
    }

    pub fn get(&self, id: Uuid) -> LedgerResult<EarningView> {
        let earning = self.require_earning(id)?;
        Ok(EarningView::assemble(&earning, &self.locale))
    }

    pub fn list_for_user(&self, user_id: Uuid) -> LedgerResult<Vec<EarningView>> {
        self.require_user(user_id)?;
        let earnings = self.store.earnings_for_user(user_id)?;
        Ok(earnings
            .iter()
            .map(|earning| EarningView::assemble(earning, &self.locale))
            .collect())
    }

    /// Removes an earning. Refused while budgets still allocate from it, so
    /// the allocation invariant cannot be broken by orphaning.
    pub fn delete(&self, id: Uuid, user_id: Uuid) -> LedgerResult<()> {
        let earning = self.require_earning(id)?;
        if earning.user_id != user_id {
            return Err(LedgerError::Unauthorized {
                entity: "earning",
                id: earning.id,
                user_id,
            });
        }
        if !self.store.budgets_for_earning(id)?.is_empty() {
            return Err(LedgerError::EarningInUse(id));
        }
        self.store
            .apply(WriteBatch::new().with(WriteOp::DeleteEarning(id)))?;
        info!(earning = %id, "earning deleted");
        Ok(())
    }

    /// Repairs each earning's derived figure by recomputing it from the
    /// budgets that currently reference it.
    pub fn recalculate_amount_budgeted(&self, user_id: Uuid) -> LedgerResult<Vec<EarningView>> {
        self.require_user(user_id)?;
        let mut batch = WriteBatch::new();
        let mut views = Vec::new();
        for mut earning in self.store.earnings_for_user(user_id)? {
            let total: f64 = self
                .store
                .budgets_for_earning(earning.id)?
                .iter()
                .map(|budget| budget.amount)
                .sum();
            earning.amount_budgeted = total;
            views.push(EarningView::assemble(&earning, &self.locale));
            batch.push(WriteOp::SaveEarning(earning));
        }
        if !batch.is_empty() {
            self.store.apply(batch)?;
        }
        info!(user = %user_id, earnings = views.len(), "amount_budgeted recalculated");
        Ok(views)
    }

    fn require_user(&self, id: Uuid) -> LedgerResult<User> {
        self.store
            .user(id)?
            .ok_or_else(|| LedgerError::not_found("user", id))
    }

    fn require_earning(&self, id: Uuid) -> LedgerResult<Earning> {
        self.store
            .earning(id)?
            .ok_or_else(|| LedgerError::not_found("earning", id))
    }
}
