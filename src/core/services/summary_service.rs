//! Read-only views over a stored series: progress snapshots and integrity checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::ServiceResult;
use crate::{
    config::EngineConfig,
    domain::{Displayable, DueState, Obligation, ObligationStatus, OccurrenceType},
    errors::ObligationError,
    storage::OccurrenceStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub head_id: Uuid,
    pub occurrence_type: OccurrenceType,
    pub members: usize,
    pub pending: usize,
    pub settled: usize,
    pub canceled: usize,
    pub overdue: usize,
    pub due_soon: usize,
    /// Earliest due date among pending members.
    pub next_due: Option<NaiveDate>,
    /// Sum of amounts over members that are not canceled.
    pub total_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub settled_amount: Decimal,
}

pub struct SummaryService;

impl SummaryService {
    /// Head plus children of the series containing `member_id`, ordered by due date.
    pub fn series_members(
        store: &dyn OccurrenceStore,
        member_id: Uuid,
    ) -> ServiceResult<Vec<Obligation>> {
        let member = store
            .select_by_id(member_id)?
            .ok_or(ObligationError::NotFound(member_id))?;
        let head_id = member.series_root();
        let head = if head_id == member.id {
            member
        } else {
            store
                .select_by_id(head_id)?
                .ok_or(ObligationError::NotFound(head_id))?
        };
        let mut members = vec![head];
        members.extend(store.select_by_parent_id(head_id)?);
        Ok(members)
    }

    pub fn series_snapshot(
        store: &dyn OccurrenceStore,
        member_id: Uuid,
        reference: NaiveDate,
        due_soon_days: i64,
    ) -> ServiceResult<SeriesSnapshot> {
        let members = Self::series_members(store, member_id)?;
        let head = &members[0];
        let mut snapshot = SeriesSnapshot {
            head_id: head.id,
            occurrence_type: head.occurrence_type,
            members: members.len(),
            pending: 0,
            settled: 0,
            canceled: 0,
            overdue: 0,
            due_soon: 0,
            next_due: None,
            total_amount: Decimal::ZERO,
            outstanding_amount: Decimal::ZERO,
            settled_amount: Decimal::ZERO,
        };

        for row in &members {
            match row.status {
                ObligationStatus::Pending => {
                    snapshot.pending += 1;
                    snapshot.total_amount += row.amount;
                    snapshot.outstanding_amount += row.amount;
                    match row.due_state(reference, due_soon_days) {
                        Some(DueState::Overdue) => snapshot.overdue += 1,
                        Some(DueState::DueSoon) => snapshot.due_soon += 1,
                        _ => {}
                    }
                    if snapshot.next_due.map_or(true, |next| row.due_date < next) {
                        snapshot.next_due = Some(row.due_date);
                    }
                }
                ObligationStatus::Paid | ObligationStatus::Received => {
                    snapshot.settled += 1;
                    snapshot.total_amount += row.amount;
                    snapshot.settled_amount += row.paid_amount.unwrap_or(row.amount);
                }
                ObligationStatus::Canceled => snapshot.canceled += 1,
            }
        }

        Ok(snapshot)
    }

    /// Lists integrity problems of the series headed by `head_id`, including a
    /// head stored without its children after an interrupted creation.
    pub fn series_warnings(
        store: &dyn OccurrenceStore,
        head_id: Uuid,
        config: &EngineConfig,
    ) -> ServiceResult<Vec<String>> {
        let head = store.select_by_id(head_id)?;
        let children = store.select_by_parent_id(head_id)?;
        let mut warnings = Vec::new();

        let head = match head {
            Some(head) => head,
            None if children.is_empty() => return Err(ObligationError::NotFound(head_id)),
            None => {
                warnings.push(format!(
                    "series head {} is missing but {} occurrence(s) reference it",
                    head_id,
                    children.len()
                ));
                return Ok(warnings);
            }
        };

        if let Some(parent) = head.parent_id {
            warnings.push(format!(
                "{} is not a series head (parent {})",
                head.display_label(),
                parent
            ));
            return Ok(warnings);
        }

        match head.occurrence_type {
            OccurrenceType::Unica => {
                if !children.is_empty() {
                    warnings.push(format!(
                        "one-off occurrence {} has {} child occurrence(s)",
                        head.id,
                        children.len()
                    ));
                }
            }
            OccurrenceType::Parcelada => {
                let expected = head.total_installments.unwrap_or(1) as usize;
                let found = children.len() + 1;
                if children.is_empty() && expected > 1 {
                    warnings.push(incomplete_batch(&head));
                } else if found != expected {
                    warnings.push(format!(
                        "series {} expects {} installments but has {}",
                        head.id, expected, found
                    ));
                }
            }
            _ => {
                if children.is_empty() && config.recurring_occurrences > 1 {
                    warnings.push(incomplete_batch(&head));
                }
            }
        }

        for child in &children {
            if child.occurrence_type != head.occurrence_type {
                warnings.push(format!(
                    "occurrence {} is {} but its head is {}",
                    child.id, child.occurrence_type, head.occurrence_type
                ));
            }
        }

        let mut previous = head.due_date;
        for child in &children {
            if child.due_date <= previous {
                warnings.push(format!(
                    "occurrence {} is due {} which does not follow {}",
                    child.id, child.due_date, previous
                ));
            }
            previous = child.due_date;
        }

        Ok(warnings)
    }
}

fn incomplete_batch(head: &Obligation) -> String {
    format!(
        "series head {} ({}) has no child occurrences; creation was likely interrupted",
        head.id, head.occurrence_type
    )
}
