//! Persistent records of the finance tracker.

pub mod budget;
pub mod category;
pub mod earning;
pub mod transaction;
pub mod user;

pub use budget::Budget;
pub use category::Category;
pub use earning::Earning;
pub use transaction::Transaction;
pub use user::User;
