#![allow(dead_code)]

use std::{
    num::NonZeroU32,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use obligation_core::{
    core::Clock,
    storage::StoreResult,
    DueDay, MemoryStore, Obligation, ObligationKind, ObligationPatch, OccurrenceStore,
    RecurringPeriod, Schedule, SeriesSpec, StoreError,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh file path inside a directory that outlives the test.
pub fn temp_store_path(file_name: &str) -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join(file_name);
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn money(raw: &str) -> Decimal {
    Decimal::from_str_exact(raw).expect("valid decimal")
}

pub fn installment_spec(total: &str, count: u32, first_due: NaiveDate, due_day: u32) -> SeriesSpec {
    SeriesSpec::new(
        ObligationKind::Payable,
        Uuid::new_v4(),
        "Equipment financing",
        money(total),
        first_due,
        first_due,
        Schedule::Installments {
            count: NonZeroU32::new(count).expect("non-zero installments"),
            due_day: DueDay::new(due_day).expect("valid due day"),
        },
    )
}

pub fn recurring_spec(
    period: RecurringPeriod,
    amount: &str,
    first_due: NaiveDate,
    due_day: u32,
) -> SeriesSpec {
    SeriesSpec::new(
        ObligationKind::Receivable,
        Uuid::new_v4(),
        "Maintenance retainer",
        money(amount),
        first_due,
        first_due,
        Schedule::Recurring {
            period,
            due_day: DueDay::new(due_day).expect("valid due day"),
        },
    )
    .with_category("services")
}

/// Clock pinned to a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).expect("valid time");
        FixedClock(Utc.from_utc_datetime(&noon))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Memory store that can be told to fail its n-th insert and every delete.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_insert_call: Option<usize>,
    fail_deletes: AtomicBool,
    insert_calls: AtomicUsize,
}

impl FlakyStore {
    /// Fails the insert call with the given 1-based index.
    pub fn failing_insert(call: usize) -> Self {
        Self {
            fail_insert_call: Some(call),
            ..Self::default()
        }
    }

    pub fn fail_deletes(self, fail: bool) -> Self {
        self.fail_deletes.store(fail, Ordering::SeqCst);
        self
    }

    pub fn heal(&self) {
        self.fail_deletes.store(false, Ordering::SeqCst);
    }
}

impl OccurrenceStore for FlakyStore {
    fn insert(&self, records: &[Obligation]) -> StoreResult<Vec<Uuid>> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_insert_call == Some(call) {
            return Err(StoreError::Backend("insert rejected".into()));
        }
        self.inner.insert(records)
    }

    fn select_by_id(&self, id: Uuid) -> StoreResult<Option<Obligation>> {
        self.inner.select_by_id(id)
    }

    fn select_by_parent_and_due_date_gte(
        &self,
        parent_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Obligation>> {
        self.inner.select_by_parent_and_due_date_gte(parent_id, date)
    }

    fn select_by_parent_id(&self, parent_id: Uuid) -> StoreResult<Vec<Obligation>> {
        self.inner.select_by_parent_id(parent_id)
    }

    fn update_by_id(&self, id: Uuid, patch: &ObligationPatch) -> StoreResult<()> {
        self.inner.update_by_id(id, patch)
    }

    fn delete_by_ids(&self, ids: &[Uuid]) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("delete rejected".into()));
        }
        self.inner.delete_by_ids(ids)
    }
}
