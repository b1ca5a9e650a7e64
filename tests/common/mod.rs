use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use fintrack_core::{
    domain::{Category, User},
    errors::{LedgerError, LedgerResult},
    ledger::{BudgetService, CreateEarningInput, EarningService, TransactionService},
    money::MoneyInput,
    notify::{DeliveryGateway, ManualClock},
    store::{MemoryStore, RecordStore},
};

/// Gateway that records every delivery for assertions. Deliveries to the
/// user configured in `fail_for` simulate a provider outage.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(Uuid, String, String)>>,
    pub fail_for: Mutex<Option<Uuid>>,
}

impl RecordingGateway {
    pub fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, title, _)| title.clone())
            .collect()
    }

    pub fn count_title(&self, title: &str) -> usize {
        self.titles().iter().filter(|t| t.as_str() == title).count()
    }
}

impl DeliveryGateway for RecordingGateway {
    fn send(&self, user_id: Uuid, title: &str, body: &str) -> LedgerResult<()> {
        if *self.fail_for.lock().unwrap() == Some(user_id) {
            return Err(LedgerError::Delivery("simulated outage".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((user_id, title.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<RecordingGateway>,
    pub clock: Arc<ManualClock>,
    pub user: User,
    pub other_user: User,
    pub category: Category,
    pub earning_id: Uuid,
    pub budgets: BudgetService,
    pub earnings: EarningService,
    pub transactions: TransactionService,
}

/// Seeds a store with one user, one category, and one earning of 1,000,000
/// running from 2025-03-01 to 2025-06-01. The clock starts at 2025-03-10.
pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(RecordingGateway::default());
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
    ));

    let user = User::new("Dana", "dana@example.com");
    store.insert_user(user.clone()).unwrap();
    let other_user = User::new("Rival", "rival@example.com");
    store.insert_user(other_user.clone()).unwrap();
    let category = Category::new("Groceries", user.id);
    store.insert_category(category.clone()).unwrap();

    let store_dyn: Arc<dyn RecordStore> = store.clone();
    let gateway_dyn: Arc<dyn DeliveryGateway> = gateway.clone();

    let earnings = EarningService::new(store_dyn.clone()).with_clock(clock.clone());
    let budgets = BudgetService::new(store_dyn.clone(), gateway_dyn).with_clock(clock.clone());
    let transactions = TransactionService::new(store_dyn);

    let earning = earnings
        .create(
            CreateEarningInput {
                name: "Salary".into(),
                general_amount: MoneyInput::Number(1_000_000.0),
                start_date: Some("2025-03-01".parse().unwrap()),
                end_date: Some("2025-06-01".parse().unwrap()),
            },
            user.id,
        )
        .unwrap();

    Fixture {
        store,
        gateway,
        clock,
        user,
        other_user,
        category,
        earning_id: earning.id,
        budgets,
        earnings,
        transactions,
    }
}

/// Checks the ledger invariant: an earning's allocation figure equals the sum
/// of the amounts of the budgets referencing it.
pub fn assert_invariant(store: &MemoryStore, earning_id: Uuid) {
    let earning = store.earning(earning_id).unwrap().expect("earning exists");
    let total: f64 = store
        .budgets_for_earning(earning_id)
        .unwrap()
        .iter()
        .map(|budget| budget.amount)
        .sum();
    assert_eq!(
        earning.amount_budgeted, total,
        "amount_budgeted drifted from the sum of linked budgets"
    );
}
