use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::RwLock,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{OccurrenceStore, StoreResult};
use crate::{
    domain::{Obligation, ObligationPatch},
    errors::StoreError,
    utils::persistence::{read_json_if_exists, write_json_atomic},
};

pub const STORE_SCHEMA_VERSION: u8 = 1;

type Rows = BTreeMap<Uuid, Obligation>;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    schema_version: u8,
    #[serde(default)]
    obligations: Vec<Obligation>,
}

/// File-backed occurrence table. The whole table lives in one JSON document
/// that is rewritten atomically after every successful write; the in-memory
/// copy only changes once the file write has succeeded.
pub struct JsonStore {
    path: PathBuf,
    rows: RwLock<Rows>,
}

impl JsonStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let rows = match read_json_if_exists::<StoreFile>(&path)? {
            Some(file) => {
                if file.schema_version > STORE_SCHEMA_VERSION {
                    return Err(StoreError::Backend(format!(
                        "store schema version {} is newer than supported version {}",
                        file.schema_version, STORE_SCHEMA_VERSION
                    )));
                }
                let mut rows = Rows::new();
                for row in file.obligations {
                    let id = row.id;
                    if rows.insert(id, row).is_some() {
                        return Err(StoreError::DuplicateId(id));
                    }
                }
                rows
            }
            None => Rows::new(),
        };
        debug!(path = %path.display(), rows = rows.len(), "opened json occurrence store");
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows<F, T>(&self, reader: F) -> StoreResult<T>
    where
        F: FnOnce(&Rows) -> T,
    {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Backend("json store lock poisoned".into()))?;
        Ok(reader(&rows))
    }

    fn mutate<F, T>(&self, mutator: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Rows) -> StoreResult<T>,
    {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Backend("json store lock poisoned".into()))?;
        let mut staged = rows.clone();
        let result = mutator(&mut staged)?;
        let file = StoreFile {
            schema_version: STORE_SCHEMA_VERSION,
            obligations: staged.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file)?;
        *rows = staged;
        Ok(result)
    }

    fn select_where<F>(&self, predicate: F) -> StoreResult<Vec<Obligation>>
    where
        F: Fn(&Obligation) -> bool,
    {
        self.read_rows(|rows| {
            let mut matched: Vec<Obligation> =
                rows.values().filter(|row| predicate(row)).cloned().collect();
            matched.sort_by_key(|row| (row.due_date, row.id));
            matched
        })
    }
}

impl OccurrenceStore for JsonStore {
    fn insert(&self, records: &[Obligation]) -> StoreResult<Vec<Uuid>> {
        self.mutate(|rows| {
            let mut seen = HashSet::new();
            for record in records {
                if rows.contains_key(&record.id) || !seen.insert(record.id) {
                    return Err(StoreError::DuplicateId(record.id));
                }
            }
            Ok(records
                .iter()
                .map(|record| {
                    rows.insert(record.id, record.clone());
                    record.id
                })
                .collect())
        })
    }

    fn select_by_id(&self, id: Uuid) -> StoreResult<Option<Obligation>> {
        self.read_rows(|rows| rows.get(&id).cloned())
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
        self.update_by_ids(&[id], patch)
    }

    fn update_by_ids(&self, ids: &[Uuid], patch: &ObligationPatch) -> StoreResult<()> {
        self.mutate(|rows| {
            for id in ids {
                if let Some(row) = rows.get_mut(id) {
                    patch.apply_to(row);
                }
            }
            Ok(())
        })
    }

    fn delete_by_ids(&self, ids: &[Uuid]) -> StoreResult<()> {
        self.mutate(|rows| {
            for id in ids {
                rows.remove(id);
            }
            Ok(())
        })
    }
}
