//! Periodic scan of budgets for alert conditions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::domain::Budget;
use crate::money::{format_currency, Locale};
use crate::store::RecordStore;

use super::gateway::DeliveryGateway;
use super::scheduler::{Cadence, Clock, Scheduler, SystemClock};

/// Percentage of the allocation at which the low-budget alert arms.
pub const LOW_BUDGET_THRESHOLD_PCT: f64 = 90.0;

/// The four independent alert conditions evaluated per budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    LowBudget,
    Deadline,
    NewMonthly,
    Overrun,
}

impl AlertKind {
    pub const ALL: [AlertKind; 4] = [
        AlertKind::LowBudget,
        AlertKind::Deadline,
        AlertKind::NewMonthly,
        AlertKind::Overrun,
    ];

    fn title(&self) -> &'static str {
        match self {
            AlertKind::LowBudget => "Low Budget Alert",
            AlertKind::Deadline => "Budget Deadline",
            AlertKind::NewMonthly => "New Monthly Budget",
            AlertKind::Overrun => "Budget Overrun",
        }
    }

    /// Dedupe key segment: daily alerts re-arm each day, the monthly alert
    /// re-arms each calendar month.
    fn period_key(&self, today: NaiveDate) -> String {
        match self {
            AlertKind::NewMonthly => format!("{}-{:02}", today.year(), today.month()),
            _ => today.to_string(),
        }
    }
}

/// Totals for one scan pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub evaluated: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    pub failed: usize,
}

/// Evaluates every budget against the alert conditions and dispatches at
/// most one notification per condition, budget, and period.
pub struct BudgetScanner {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn DeliveryGateway>,
    clock: Arc<dyn Clock>,
    locale: Locale,
    dispatched: Mutex<HashSet<(Uuid, AlertKind, String)>>,
}

impl BudgetScanner {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self {
            store,
            gateway,
            clock: Arc::new(SystemClock),
            locale: Locale::default(),
            dispatched: Mutex::new(HashSet::new()),
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

    /// Runs one pass over all budgets for the given conditions.
    ///
    /// One budget's delivery failure never aborts the rest of the pass; it is
    /// logged and counted in the report.
    pub fn scan(&self, kinds: &[AlertKind]) -> ScanReport {
        let today = self.clock.today();
        // Entries from past periods can never suppress again; drop them so
        // the log stays bounded by the live budget population.
        self.dispatched
            .lock()
            .expect("scan log mutex poisoned")
            .retain(|(_, kind, period)| *period == kind.period_key(today));
        let mut report = ScanReport::default();
        let budgets = match self.store.budgets() {
            Ok(budgets) => budgets,
            Err(err) => {
                error!(%err, "scan aborted: could not load budgets");
                return report;
            }
        };
        for budget in &budgets {
            report.evaluated += 1;
            for kind in kinds {
                if let Some(body) = self.evaluate(*kind, budget, today) {
                    self.dispatch(*kind, budget, today, &body, &mut report);
                }
            }
        }
        report
    }

    /// Runs one pass with every condition armed. Exposed so the scan can be
    /// triggered manually as well as by the scheduler.
    pub fn scan_all(&self) -> ScanReport {
        self.scan(&AlertKind::ALL)
    }

    fn evaluate(&self, kind: AlertKind, budget: &Budget, today: NaiveDate) -> Option<String> {
        match kind {
            AlertKind::LowBudget => {
                let pct = budget.spent_ratio()?;
                (pct >= LOW_BUDGET_THRESHOLD_PCT).then(|| {
                    format!(
                        "Budget `{}` has {:.1}% of its allocation spent.",
                        budget.name, pct
                    )
                })
            }
            AlertKind::Deadline => ((budget.end_date - today).num_days() == 1).then(|| {
                format!(
                    "Budget `{}` ends tomorrow ({}).",
                    budget.name, budget.end_date
                )
            }),
            AlertKind::NewMonthly => (budget.start_date.year() == today.year()
                && budget.start_date.month() == today.month())
            .then(|| {
                format!(
                    "A new monthly budget `{}` started on {}.",
                    budget.name, budget.start_date
                )
            }),
            AlertKind::Overrun => (budget.amount_spent > budget.amount).then(|| {
                format!(
                    "Budget `{}` is overspent: {} of {}.",
                    budget.name,
                    format_currency(budget.amount_spent, &self.locale),
                    format_currency(budget.amount, &self.locale)
                )
            }),
        }
    }

    fn dispatch(
        &self,
        kind: AlertKind,
        budget: &Budget,
        today: NaiveDate,
        body: &str,
        report: &mut ScanReport,
    ) {
        let key = (budget.id, kind, kind.period_key(today));
        let fresh = self
            .dispatched
            .lock()
            .expect("scan log mutex poisoned")
            .insert(key);
        if !fresh {
            report.suppressed += 1;
            return;
        }
        match self.gateway.send(budget.user_id, kind.title(), body) {
            Ok(()) => report.dispatched += 1,
            Err(err) => {
                warn!(budget = %budget.id, alert = ?kind, %err, "alert delivery failed");
                report.failed += 1;
            }
        }
    }
}

/// Registers the reference cadence on a scheduler: low-budget, deadline, and
/// overrun daily, new-monthly on the first day of each month.
pub fn register_scan_tasks(
    scheduler: &mut Scheduler,
    scanner: Arc<BudgetScanner>,
    config: &ScanConfig,
) {
    let daily = Arc::clone(&scanner);
    scheduler.register(
        "budget-alerts-daily",
        Cadence::Daily {
            hour: config.daily_hour,
        },
        move || {
            daily.scan(&[AlertKind::LowBudget, AlertKind::Deadline, AlertKind::Overrun]);
        },
    );
    scheduler.register(
        "budget-alerts-monthly",
        Cadence::MonthlyFirstDay {
            hour: config.monthly_hour,
        },
        move || {
            scanner.scan(&[AlertKind::NewMonthly]);
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::validate_range;
    use crate::domain::Budget;
    use crate::errors::LedgerResult;
    use crate::notify::scheduler::ManualClock;
    use crate::store::{MemoryStore, WriteBatch, WriteOp};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    struct NullGateway;

    impl DeliveryGateway for NullGateway {
        fn send(&self, _user_id: Uuid, _title: &str, _body: &str) -> LedgerResult<()> {
            Ok(())
        }
    }

    fn low_budget_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let window = validate_range(start, None).unwrap();
        let mut budget = Budget::new(
            "Groceries",
            None,
            100_000.0,
            window,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        budget.amount_spent = 95_000.0;
        store
            .apply(WriteBatch::new().with(WriteOp::SaveBudget(budget)))
            .unwrap();
        store
    }

    #[test]
    fn stale_dedupe_entries_are_dropped_each_pass() {
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
        ));
        let store: Arc<dyn RecordStore> = low_budget_store();
        let scanner =
            BudgetScanner::new(store, Arc::new(NullGateway)).with_clock(clock.clone());

        assert_eq!(scanner.scan(&[AlertKind::LowBudget]).dispatched, 1);
        assert_eq!(scanner.dispatched.lock().unwrap().len(), 1);

        for _ in 0..3 {
            clock.advance(Duration::days(1));
            assert_eq!(scanner.scan(&[AlertKind::LowBudget]).dispatched, 1);
            // Yesterday's entry is pruned, never accumulated.
            assert_eq!(scanner.dispatched.lock().unwrap().len(), 1);
        }
    }

    #[test]
    fn current_period_entries_survive_the_prune() {
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
        ));
        let store: Arc<dyn RecordStore> = low_budget_store();
        let scanner =
            BudgetScanner::new(store, Arc::new(NullGateway)).with_clock(clock.clone());

        assert_eq!(scanner.scan(&[AlertKind::LowBudget]).dispatched, 1);
        clock.advance(Duration::hours(6));
        let later = scanner.scan(&[AlertKind::LowBudget]);
        assert_eq!(later.dispatched, 0);
        assert_eq!(later.suppressed, 1);
    }
}
