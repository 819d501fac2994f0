//! Pending → settled/canceled transitions for a single occurrence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::ServiceResult;
use crate::{
    core::money,
    domain::{Obligation, ObligationPatch, ObligationStatus},
    errors::ObligationError,
    storage::OccurrenceStore,
};

/// Drives the status machine of one row. Never looks at the rest of its series.
pub struct StatusService;

impl StatusService {
    /// Records payment (payables) or receipt (receivables) of `id`.
    pub fn confirm_payment(
        store: &dyn OccurrenceStore,
        id: Uuid,
        payment_date: NaiveDate,
        amount: Decimal,
    ) -> ServiceResult<Obligation> {
        if amount <= Decimal::ZERO {
            return Err(ObligationError::validation(format!(
                "paid amount must be positive, got {}",
                amount
            )));
        }
        let current = load(store, id)?;
        let next = current.kind.settled_status();
        let patch = ObligationPatch::settlement(
            next,
            Some(payment_date),
            Some(money::round_cents(amount)),
        );
        let updated = Self::transition(store, current, &patch)?;
        info!(id = %id, status = %next, %payment_date, "occurrence settled");
        Ok(updated)
    }

    pub fn cancel(store: &dyn OccurrenceStore, id: Uuid) -> ServiceResult<Obligation> {
        let current = load(store, id)?;
        let patch = ObligationPatch::settlement(ObligationStatus::Canceled, None, None);
        let updated = Self::transition(store, current, &patch)?;
        info!(id = %id, "occurrence canceled");
        Ok(updated)
    }

    /// Checks that `current` may move to `next`. A payable settles only as
    /// `paid` and a receivable only as `received`.
    pub fn ensure_transition(current: &Obligation, next: ObligationStatus) -> ServiceResult<()> {
        let settles_wrong_kind = matches!(next, ObligationStatus::Paid | ObligationStatus::Received)
            && next != current.kind.settled_status();
        if settles_wrong_kind || !current.status.can_transition_to(next) {
            return Err(ObligationError::InvalidTransition {
                id: current.id,
                from: current.status,
                to: next,
            });
        }
        Ok(())
    }

    fn transition(
        store: &dyn OccurrenceStore,
        mut current: Obligation,
        patch: &ObligationPatch,
    ) -> ServiceResult<Obligation> {
        let next = patch
            .status
            .ok_or_else(|| ObligationError::validation("transition patch carries no status"))?;
        Self::ensure_transition(&current, next)?;
        store.update_by_id(current.id, patch)?;
        patch.apply_to(&mut current);
        Ok(current)
    }
}

fn load(store: &dyn OccurrenceStore, id: Uuid) -> ServiceResult<Obligation> {
    store.select_by_id(id)?.ok_or(ObligationError::NotFound(id))
}
