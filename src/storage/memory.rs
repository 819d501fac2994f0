use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::NaiveDate;
use uuid::Uuid;

use super::{OccurrenceStore, StoreResult};
use crate::{
    domain::{Obligation, ObligationPatch},
    errors::StoreError,
};

/// In-memory occurrence table. Reference backend for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<Uuid, Obligation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Obligation>) -> StoreResult<Self> {
        let store = Self::new();
        store.insert(&records)?;
        Ok(store)
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Every stored row ordered by due date, then id.
    pub fn snapshot(&self) -> StoreResult<Vec<Obligation>> {
        let rows = self.read()?;
        Ok(sorted(rows.values().cloned().collect()))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<Uuid, Obligation>>> {
        self.rows
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<Uuid, Obligation>>> {
        self.rows
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn select_where<F>(&self, predicate: F) -> StoreResult<Vec<Obligation>>
    where
        F: Fn(&Obligation) -> bool,
    {
        let rows = self.read()?;
        Ok(sorted(
            rows.values().filter(|row| predicate(row)).cloned().collect(),
        ))
    }
}

impl OccurrenceStore for MemoryStore {
    fn insert(&self, records: &[Obligation]) -> StoreResult<Vec<Uuid>> {
        let mut rows = self.write()?;
        let mut seen = std::collections::HashSet::new();
        for record in records {
            if rows.contains_key(&record.id) || !seen.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
        }
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(record.id);
            rows.insert(record.id, record.clone());
        }
        Ok(ids)
    }

    fn select_by_id(&self, id: Uuid) -> StoreResult<Option<Obligation>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn select_by_parent_and_due_date_gte(
        &self,
        parent_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Obligation>> {
        self.select_where(|row| row.parent_id == Some(parent_id) && row.due_date >= date)
    }

    fn select_by_parent_id(&self, parent_id: Uuid) -> StoreResult<Vec<Obligation>> {
        self.select_where(|row| row.parent_id == Some(parent_id))
    }

    fn update_by_id(&self, id: Uuid, patch: &ObligationPatch) -> StoreResult<()> {
        let mut rows = self.write()?;
        if let Some(row) = rows.get_mut(&id) {
            patch.apply_to(row);
        }
        Ok(())
    }

    fn update_by_ids(&self, ids: &[Uuid], patch: &ObligationPatch) -> StoreResult<()> {
        let mut rows = self.write()?;
        for id in ids {
            if let Some(row) = rows.get_mut(id) {
                patch.apply_to(row);
            }
        }
        Ok(())
    }

    fn delete_by_ids(&self, ids: &[Uuid]) -> StoreResult<()> {
        let mut rows = self.write()?;
        for id in ids {
            rows.remove(id);
        }
        Ok(())
    }
}

fn sorted(mut rows: Vec<Obligation>) -> Vec<Obligation> {
    rows.sort_by_key(|row| (row.due_date, row.id));
    rows
}
