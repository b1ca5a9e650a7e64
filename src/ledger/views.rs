//! Display projections returned by the ledger services.
//!
//! Monetary fields are locale-formatted strings; callers never do arithmetic
//! on them.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Budget, Category, Earning, Transaction, User};
use crate::money::{format_currency, Locale};

/// Identity plus display name of a referenced record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

impl NamedRef {
    fn of(id: Uuid, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Earning reference carrying its allocation figure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EarningSummary {
    pub id: Uuid,
    pub name: String,
    pub amount_budgeted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount: String,
    pub amount_spent: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: NamedRef,
    pub earning: EarningSummary,
    pub user: NamedRef,
}

impl BudgetView {
    pub(crate) fn assemble(
        budget: &Budget,
        category: &Category,
        earning: &Earning,
        user: &User,
        locale: &Locale,
    ) -> Self {
        Self {
            id: budget.id,
            name: budget.name.clone(),
            description: budget.description.clone(),
            amount: format_currency(budget.amount, locale),
            amount_spent: format_currency(budget.amount_spent, locale),
            start_date: budget.start_date,
            end_date: budget.end_date,
            category: NamedRef::of(category.id, &category.name),
            earning: EarningSummary {
                id: earning.id,
                name: earning.name.clone(),
                amount_budgeted: format_currency(earning.amount_budgeted, locale),
            },
            user: NamedRef::of(user.id, &user.name),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EarningView {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub general_amount: String,
    pub amount_budgeted: String,
    pub available_amount: String,
}

impl EarningView {
    pub(crate) fn assemble(earning: &Earning, locale: &Locale) -> Self {
        Self {
            id: earning.id,
            name: earning.name.clone(),
            start_date: earning.start_date,
            end_date: earning.end_date,
            general_amount: format_currency(earning.general_amount, locale),
            amount_budgeted: format_currency(earning.amount_budgeted, locale),
            available_amount: format_currency(earning.available_amount(), locale),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub amount: String,
    pub description: Option<String>,
    pub budget: NamedRef,
}

impl TransactionView {
    pub(crate) fn assemble(txn: &Transaction, budget: &Budget, locale: &Locale) -> Self {
        Self {
            id: txn.id,
            amount: format_currency(txn.amount, locale),
            description: txn.description.clone(),
            budget: NamedRef::of(budget.id, &budget.name),
        }
    }
}
