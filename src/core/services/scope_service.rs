//! Resolves "this one / this and following / whole series" into concrete ids and
//! applies bulk edits and deletes over them.

use std::{collections::HashSet, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ServiceResult;
use crate::{
    core::money,
    domain::{Identifiable, Obligation, ObligationPatch},
    errors::ObligationError,
    storage::OccurrenceStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Breadth of a bulk edit or delete.
pub enum BulkScope {
    Single,
    Following,
    All,
}

impl fmt::Display for BulkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BulkScope::Single => "single",
            BulkScope::Following => "following",
            BulkScope::All => "all",
        };
        f.write_str(label)
    }
}

impl FromStr for BulkScope {
    type Err = ObligationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(BulkScope::Single),
            "following" => Ok(BulkScope::Following),
            "all" => Ok(BulkScope::All),
            other => Err(ObligationError::validation(format!(
                "unknown scope `{}`",
                other
            ))),
        }
    }
}

pub struct ScopeService;

impl ScopeService {
    /// Computes the ids a bulk operation on `target` must touch.
    ///
    /// The result is never empty: whenever the series head cannot be read the
    /// selection falls back to the target alone. Reads and the caller's later
    /// write are separate calls, so the selection is a snapshot.
    pub fn resolve(
        store: &dyn OccurrenceStore,
        target: &Obligation,
        scope: BulkScope,
    ) -> ServiceResult<Vec<Uuid>> {
        let ids = match scope {
            BulkScope::Single => vec![target.id],
            BulkScope::Following => {
                let parent_id = target.series_root();
                if store.select_by_id(parent_id)?.is_none() {
                    warn!(target = %target.id, %parent_id, "series head missing, limiting scope to target");
                    vec![target.id]
                } else {
                    let members =
                        store.select_by_parent_and_due_date_gte(parent_id, target.due_date)?;
                    ordered_ids(target.id, members)
                }
            }
            BulkScope::All => {
                let parent_id = target.series_root();
                match store.select_by_id(parent_id)? {
                    Some(head) => ordered_ids(head.id, store.select_by_parent_id(parent_id)?),
                    None => {
                        warn!(target = %target.id, %parent_id, "series head missing, limiting scope to target");
                        vec![target.id]
                    }
                }
            }
        };

        debug!(target = %target.id, %scope, selected = ids.len(), "scope resolved");
        Ok(ids)
    }

    /// Applies `patch` to every id in the scope of `target` and returns them.
    pub fn apply_bulk_edit(
        store: &dyn OccurrenceStore,
        target: &Obligation,
        patch: &ObligationPatch,
        scope: BulkScope,
    ) -> ServiceResult<Vec<Uuid>> {
        let patch = normalize_bulk_patch(patch, scope)?;
        let current = reload(store, target.id)?;
        let ids = Self::resolve(store, &current, scope)?;
        store.update_by_ids(&ids, &patch)?;
        info!(target = %current.id, %scope, updated = ids.len(), "bulk edit applied");
        Ok(ids)
    }

    /// Deletes every id in the scope of `target` and returns them.
    pub fn apply_bulk_delete(
        store: &dyn OccurrenceStore,
        target: &Obligation,
        scope: BulkScope,
    ) -> ServiceResult<Vec<Uuid>> {
        let current = reload(store, target.id)?;
        let ids = Self::resolve(store, &current, scope)?;
        store.delete_by_ids(&ids)?;
        info!(target = %current.id, %scope, deleted = ids.len(), "bulk delete applied");
        Ok(ids)
    }
}

fn reload(store: &dyn OccurrenceStore, id: Uuid) -> ServiceResult<Obligation> {
    store.select_by_id(id)?.ok_or(ObligationError::NotFound(id))
}

fn ordered_ids<T: Identifiable>(first: Uuid, members: Vec<T>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    std::iter::once(first)
        .chain(members.iter().map(Identifiable::id))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Validates a bulk edit and returns it with the amount rounded to whole cents.
fn normalize_bulk_patch(
    patch: &ObligationPatch,
    scope: BulkScope,
) -> ServiceResult<ObligationPatch> {
    if patch.is_empty() {
        return Err(ObligationError::validation("edit payload is empty"));
    }
    if patch.touches_settlement() {
        return Err(ObligationError::validation(
            "status and settlement fields change only through payment confirmation or cancellation",
        ));
    }
    if patch.due_date.is_some() && scope != BulkScope::Single {
        return Err(ObligationError::validation(format!(
            "due_date can only be edited one occurrence at a time, not with scope `{}`",
            scope
        )));
    }
    if let Some(description) = &patch.description {
        if description.trim().is_empty() {
            return Err(ObligationError::validation("description must not be blank"));
        }
    }
    let mut normalized = patch.clone();
    if let Some(amount) = patch.amount {
        let rounded = money::round_cents(amount);
        if rounded <= Decimal::ZERO {
            return Err(ObligationError::validation(format!(
                "amount must be at least 0.01, got {}",
                amount
            )));
        }
        normalized.amount = Some(rounded);
    }
    Ok(normalized)
}
