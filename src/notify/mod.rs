//! Alert evaluation, scheduling, and delivery.

pub mod gateway;
pub mod scanner;
pub mod scheduler;

pub use gateway::{DeliveryConfig, DeliveryGateway, LoggingGateway};
pub use scanner::{register_scan_tasks, AlertKind, BudgetScanner, ScanReport};
pub use scheduler::{Cadence, Clock, ManualClock, Scheduler, SystemClock};
