pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    domain::{Obligation, ObligationPatch},
    errors::StoreError,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence collaborator the engine reads from and writes to.
///
/// Each call stands alone: the engine never assumes two calls run atomically.
/// Updates and deletes that name unknown ids leave the store untouched, and
/// range reads return rows ordered by due date.
pub trait OccurrenceStore: Send + Sync {
    /// Inserts every record, returning their ids in input order. Rejects ids
    /// that already exist.
    fn insert(&self, records: &[Obligation]) -> StoreResult<Vec<Uuid>>;
    fn select_by_id(&self, id: Uuid) -> StoreResult<Option<Obligation>>;
    fn select_by_parent_and_due_date_gte(
        &self,
        parent_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Obligation>>;
    fn select_by_parent_id(&self, parent_id: Uuid) -> StoreResult<Vec<Obligation>>;
    fn update_by_id(&self, id: Uuid, patch: &ObligationPatch) -> StoreResult<()>;
    fn delete_by_ids(&self, ids: &[Uuid]) -> StoreResult<()>;

    /// Applies one patch to many rows. Backends with a native multi-row update
    /// should override the per-row default.
    fn update_by_ids(&self, ids: &[Uuid], patch: &ObligationPatch) -> StoreResult<()> {
        for id in ids {
            self.update_by_id(*id, patch)?;
        }
        Ok(())
    }
}

pub use json_backend::{JsonStore, STORE_SCHEMA_VERSION};
pub use memory::MemoryStore;
