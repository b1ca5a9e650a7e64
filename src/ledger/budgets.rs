//! Budget operations and the allocation invariant.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dates::validate_range;
use crate::domain::{Budget, Category, Earning, User};
use crate::errors::{LedgerError, LedgerResult};
use crate::money::{format_currency, parse_money, Locale, MoneyInput};
use crate::notify::{Clock, DeliveryGateway, SystemClock};
use crate::store::{RecordStore, WriteBatch, WriteOp};

use super::views::BudgetView;

/// Fields accepted when creating a budget. The start date defaults to the
/// creation date and the end date to one month later.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    pub name: String,
    pub description: Option<String>,
    pub amount: MoneyInput,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Uuid,
    pub earning_id: Uuid,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UpdateBudgetInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<MoneyInput>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub earning_id: Option<Uuid>,
}

impl UpdateBudgetInput {
    /// An update that touches nothing but the id.
    pub fn for_id(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            description: None,
            amount: None,
            start_date: None,
            end_date: None,
            category_id: None,
            earning_id: None,
        }
    }
}

/// Create/update/delete operations on budgets that keep the linked earning's
/// `amount_budgeted` consistent.
pub struct BudgetService {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn DeliveryGateway>,
    clock: Arc<dyn Clock>,
    locale: Locale,
}

impl BudgetService {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self {
            store,
            gateway,
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

    /// Creates a budget and commits its amount against the earning.
    ///
    /// Allocating past the earning's unbudgeted income is allowed; it only
    /// triggers an advisory notification before the write.
    pub fn create(&self, input: CreateBudgetInput, user_id: Uuid) -> LedgerResult<BudgetView> {
        let category = self.require_category(input.category_id)?;
        let earning = self.require_earning(input.earning_id)?;
        let user = self.require_user(user_id)?;
        let amount = parse_money(&input.amount)?;
        let start = input.start_date.unwrap_or_else(|| self.clock.today());
        let window = validate_range(start, input.end_date)?;

        let available = earning.available_amount();
        if amount > available {
            self.notify_exceeded(&earning, user_id, amount, available);
        }

        let budget = Budget::new(
            input.name,
            input.description,
            amount,
            window,
            category.id,
            earning.id,
            user.id,
        );
        let batch = WriteBatch::new()
            .with(WriteOp::AdjustEarningBudgeted {
                id: earning.id,
                delta: amount,
            })
            .with(WriteOp::SaveBudget(budget.clone()));
        self.store.apply(batch)?;
        info!(budget = %budget.id, earning = %earning.id, amount, "budget created");

        let earning = self.require_earning(earning.id)?;
        Ok(BudgetView::assemble(
            &budget,
            &category,
            &earning,
            &user,
            &self.locale,
        ))
    }

    /// Updates a budget, re-allocating against its earning as needed.
    ///
    /// A same-earning amount change applies the delta; moving the budget to
    /// a different earning releases the full old amount from the old earning
    /// and commits the full new amount to the new one.
    pub fn update(&self, input: UpdateBudgetInput, user_id: Uuid) -> LedgerResult<BudgetView> {
        let mut budget = self.require_budget(input.id)?;
        if budget.user_id != user_id {
            return Err(LedgerError::Unauthorized {
                entity: "budget",
                id: budget.id,
                user_id,
            });
        }
        let category = self.require_category(input.category_id.unwrap_or(budget.category_id))?;
        let earning = self.require_earning(input.earning_id.unwrap_or(budget.earning_id))?;
        let user = self.require_user(user_id)?;

        let old_amount = budget.amount;
        let new_amount = match &input.amount {
            Some(raw) => parse_money(raw)?,
            None => old_amount,
        };

        let mut batch = WriteBatch::new();
        if earning.id != budget.earning_id {
            batch.push(WriteOp::AdjustEarningBudgeted {
                id: budget.earning_id,
                delta: -old_amount,
            });
            batch.push(WriteOp::AdjustEarningBudgeted {
                id: earning.id,
                delta: new_amount,
            });
        } else if new_amount != old_amount {
            batch.push(WriteOp::AdjustEarningBudgeted {
                id: earning.id,
                delta: new_amount - old_amount,
            });
        }

        if input.start_date.is_some() || input.end_date.is_some() {
            let start = input.start_date.unwrap_or(budget.start_date);
            let end = input.end_date.unwrap_or(budget.end_date);
            let window = validate_range(start, Some(end))?;
            budget.start_date = window.start;
            budget.end_date = window.end;
        }
        if let Some(name) = input.name {
            budget.name = name;
        }
        if let Some(description) = input.description {
            budget.description = Some(description);
        }
        budget.amount = new_amount;
        budget.category_id = category.id;
        budget.earning_id = earning.id;

        batch.push(WriteOp::SaveBudget(budget.clone()));
        self.store.apply(batch)?;
        info!(budget = %budget.id, earning = %earning.id, "budget updated");

        let earning = self.require_earning(earning.id)?;
        Ok(BudgetView::assemble(
            &budget,
            &category,
            &earning,
            &user,
            &self.locale,
        ))
    }

    /// Deletes a budget and releases its allocation back to the earning.
    pub fn delete(&self, id: Uuid, user_id: Uuid) -> LedgerResult<()> {
        let budget = self.require_budget(id)?;
        if budget.user_id != user_id {
            return Err(LedgerError::Unauthorized {
                entity: "budget",
                id: budget.id,
                user_id,
            });
        }
        let batch = WriteBatch::new()
            .with(WriteOp::AdjustEarningBudgeted {
                id: budget.earning_id,
                delta: -budget.amount,
            })
            .with(WriteOp::DeleteBudget(id));
        self.store.apply(batch)?;
        info!(budget = %id, earning = %budget.earning_id, "budget deleted, allocation released");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> LedgerResult<BudgetView> {
        let budget = self.require_budget(id)?;
        self.view_of(&budget)
    }

    pub fn list_for_user(&self, user_id: Uuid) -> LedgerResult<Vec<BudgetView>> {
        self.require_user(user_id)?;
        let budgets = self.store.budgets_for_user(user_id)?;
        budgets.iter().map(|budget| self.view_of(budget)).collect()
    }

    fn view_of(&self, budget: &Budget) -> LedgerResult<BudgetView> {
        let category = self.require_category(budget.category_id)?;
        let earning = self.require_earning(budget.earning_id)?;
        let user = self.require_user(budget.user_id)?;
        Ok(BudgetView::assemble(
            budget,
            &category,
            &earning,
            &user,
            &self.locale,
        ))
    }

    fn notify_exceeded(&self, earning: &Earning, user_id: Uuid, amount: f64, available: f64) {
        let body = format!(
            "The requested budget of {} exceeds the {} still unallocated on earning `{}`.",
            format_currency(amount, &self.locale),
            format_currency(available, &self.locale),
            earning.name
        );
        if let Err(err) = self.gateway.send(user_id, "Budget exceeded", &body) {
            warn!(%user_id, %err, "exceeded-funds advisory could not be delivered");
        }
    }

    fn require_user(&self, id: Uuid) -> LedgerResult<User> {
        self.store
            .user(id)?
            .ok_or_else(|| LedgerError::not_found("user", id))
    }

    fn require_category(&self, id: Uuid) -> LedgerResult<Category> {
        self.store
            .category(id)?
            .ok_or_else(|| LedgerError::not_found("category", id))
    }

    fn require_earning(&self, id: Uuid) -> LedgerResult<Earning> {
        self.store
            .earning(id)?
            .ok_or_else(|| LedgerError::not_found("earning", id))
    }

    fn require_budget(&self, id: Uuid) -> LedgerResult<Budget> {
        self.store
            .budget(id)?
            .ok_or_else(|| LedgerError::not_found("budget", id))
    }
}
