//! Periodic-task scheduling driven by an injectable clock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use crate::dates::shift_month;

/// Source of "now" for the ledger, scanner, and scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// How often a task fires. Hours are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Every day at the given hour.
    Daily { hour: u32 },
    /// The first day of every month at the given hour.
    MonthlyFirstDay { hour: u32 },
}

impl Cadence {
    /// First due time strictly after `from`.
    pub fn next_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Cadence::Daily { hour } => {
                let candidate = at_hour(from.date_naive(), hour);
                if candidate > from {
                    candidate
                } else {
                    at_hour(from.date_naive() + Duration::days(1), hour)
                }
            }
            Cadence::MonthlyFirstDay { hour } => {
                let first = from
                    .date_naive()
                    .with_day(1)
                    .unwrap_or_else(|| from.date_naive());
                let candidate = at_hour(first, hour);
                if candidate > from {
                    candidate
                } else {
                    at_hour(shift_month(first, 1), hour)
                }
            }
        }
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(time))
}

struct Task {
    name: String,
    cadence: Cadence,
    next_due: DateTime<Utc>,
    action: Box<dyn FnMut() + Send>,
}

/// Runs named tasks whenever the injected clock passes their due time.
///
/// `run_pending` is the only driver; production wires it to a timer loop,
/// tests advance a [`ManualClock`] and call it directly. A task fires at most
/// once per `run_pending` call even if the clock skipped several periods.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        cadence: Cadence,
        action: impl FnMut() + Send + 'static,
    ) {
        let next_due = cadence.next_after(self.clock.now());
        self.tasks.push(Task {
            name: name.into(),
            cadence,
            next_due,
            action: Box::new(action),
        });
    }

    /// Runs every task whose due time has passed; returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        for task in &mut self.tasks {
            if task.next_due <= now {
                debug!(task = %task.name, due = %task.next_due, "running scheduled task");
                (task.action)();
                task.next_due = task.cadence.next_after(now);
                ran += 1;
            }
        }
        ran
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn daily_cadence_steps_to_the_next_day() {
        let cadence = Cadence::Daily { hour: 8 };
        assert_eq!(cadence.next_after(utc(2025, 3, 10, 7)), utc(2025, 3, 10, 8));
        assert_eq!(cadence.next_after(utc(2025, 3, 10, 8)), utc(2025, 3, 11, 8));
    }

    #[test]
    fn monthly_cadence_lands_on_the_first() {
        let cadence = Cadence::MonthlyFirstDay { hour: 8 };
        assert_eq!(cadence.next_after(utc(2025, 3, 10, 12)), utc(2025, 4, 1, 8));
        assert_eq!(cadence.next_after(utc(2025, 12, 15, 0)), utc(2026, 1, 1, 8));
        assert_eq!(cadence.next_after(utc(2025, 3, 1, 7)), utc(2025, 3, 1, 8));
    }

    #[test]
    fn tasks_fire_once_per_due_period() {
        let clock = Arc::new(ManualClock::starting_at(utc(2025, 3, 10, 12)));
        let count = Arc::new(Mutex::new(0usize));
        let mut scheduler = Scheduler::new(clock.clone());
        let counter = count.clone();
        scheduler.register("counter", Cadence::Daily { hour: 8 }, move || {
            *counter.lock().unwrap() += 1;
        });

        assert_eq!(scheduler.run_pending(), 0);
        clock.set(utc(2025, 3, 11, 9));
        assert_eq!(scheduler.run_pending(), 1);
        assert_eq!(scheduler.run_pending(), 0);
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
