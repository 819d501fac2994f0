#![doc(test(attr(deny(warnings))))]

//! Obligation Core is the recurring and installment engine behind accounts
//! payable and receivable: it expands a schedule into a dated series, resolves
//! single/following/all scopes for bulk edits and deletes, and drives the
//! pending → settled/canceled status of individual occurrences.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::config::{EngineConfig, RemainderPolicy};
pub use crate::core::{
    services::{BulkScope, SeriesSnapshot},
    Clock, ObligationManager, SystemClock,
};
pub use crate::domain::{
    DueDay, DueState, Obligation, ObligationKind, ObligationPatch, ObligationStatus,
    OccurrenceType, RecurringPeriod, Schedule, SeriesRequest, SeriesSpec,
};
pub use crate::errors::{ObligationError, StoreError};
pub use crate::storage::{JsonStore, MemoryStore, OccurrenceStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Obligation Core tracing initialized.");
    });
}
