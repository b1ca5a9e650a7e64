//! Allocation ledger services.
//!
//! [`BudgetService`] owns the core invariant: for every earning,
//! `amount_budgeted` equals the sum of the amounts of the budgets funded
//! from it. All multi-record mutations go through the store's atomic
//! [`WriteBatch`](crate::store::WriteBatch) unit of work, and allocation
//! adjustments are expressed as store-level deltas so concurrent requests
//! serialize inside the store.

pub mod budgets;
pub mod earnings;
pub mod transactions;
pub mod views;

pub use budgets::{BudgetService, CreateBudgetInput, UpdateBudgetInput};
pub use earnings::{CreateEarningInput, EarningService};
pub use transactions::{CreateTransactionInput, TransactionService};
pub use views::{BudgetView, EarningSummary, EarningView, NamedRef, TransactionView};
