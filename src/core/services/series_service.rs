//! Expands a series specification into dated occurrences and persists them.

use std::num::NonZeroU32;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::ServiceResult;
use crate::{
    config::{EngineConfig, MAX_SERIES_OCCURRENCES},
    core::{dates::month_offset_on_day, money},
    domain::{DueDay, Obligation, ObligationStatus, Schedule, SeriesSpec},
    errors::ObligationError,
    storage::OccurrenceStore,
};

/// Builds occurrence batches from a schedule and writes them head first.
pub struct SeriesService;

impl SeriesService {
    /// Builds the batch for `spec`, head first, without touching storage.
    pub fn generate(spec: &SeriesSpec, config: &EngineConfig) -> ServiceResult<Vec<Obligation>> {
        validate_spec(spec, config)?;

        match spec.schedule {
            Schedule::Single => {
                let amount = money::round_cents(spec.amount);
                Ok(vec![occurrence(spec, Uuid::new_v4(), spec.due_date, amount)])
            }
            Schedule::Recurring { period, due_day } => {
                let horizon = config.recurring_occurrences as usize;
                let amounts = vec![money::round_cents(spec.amount); horizon];
                build_series(spec, due_day, period.months(), amounts, None)
            }
            Schedule::Installments { count, due_day } => {
                let amounts = money::split_installments(spec.amount, count, config.remainder_policy);
                build_series(spec, due_day, 1, amounts, Some(count))
            }
        }
    }

    /// Generates the batch and stores it as two inserts: the head, then its
    /// children. When the children insert fails the head is deleted again and
    /// the original store error is returned; if that delete fails as well the
    /// caller receives [`ObligationError::PartialSeries`] naming the head left
    /// behind.
    pub fn create(
        store: &dyn OccurrenceStore,
        spec: &SeriesSpec,
        config: &EngineConfig,
    ) -> ServiceResult<Vec<Obligation>> {
        let batch = Self::generate(spec, config)?;
        let (head, children) = batch
            .split_first()
            .ok_or_else(|| ObligationError::validation("schedule produced no occurrences"))?;

        store.insert(std::slice::from_ref(head))?;

        if !children.is_empty() {
            if let Err(err) = store.insert(children) {
                warn!(head_id = %head.id, error = %err, "child insert failed, removing series head");
                if let Err(rollback) = store.delete_by_ids(&[head.id]) {
                    error!(head_id = %head.id, error = %rollback, "series head left without children");
                    return Err(ObligationError::PartialSeries {
                        head_id: head.id,
                        source: err,
                        rollback,
                    });
                }
                return Err(err.into());
            }
        }

        info!(
            head_id = %head.id,
            kind = %head.kind,
            occurrence_type = %head.occurrence_type,
            occurrences = batch.len(),
            "series created"
        );
        Ok(batch)
    }
}

fn validate_spec(spec: &SeriesSpec, config: &EngineConfig) -> ServiceResult<()> {
    if spec.description.trim().is_empty() {
        return Err(ObligationError::validation("description must not be blank"));
    }
    if spec.amount <= Decimal::ZERO {
        return Err(ObligationError::validation(format!(
            "amount must be positive, got {}",
            spec.amount
        )));
    }
    match spec.schedule {
        Schedule::Single => Ok(()),
        Schedule::Recurring { period, due_day } => {
            if config.recurring_occurrences == 0 {
                return Err(ObligationError::validation(
                    "recurring_occurrences must be at least 1",
                ));
            }
            check_series_length(spec, config.recurring_occurrences, period.months(), due_day)
        }
        Schedule::Installments { count, due_day } => {
            check_series_length(spec, count.get(), 1, due_day)?;
            let smallest_split = Decimal::new(i64::from(count.get()), 2);
            if money::round_cents(spec.amount) < smallest_split {
                return Err(ObligationError::validation(format!(
                    "amount {} cannot be split into {} installments of at least 0.01",
                    spec.amount, count
                )));
            }
            Ok(())
        }
    }
}

/// Rejects series that are too long or whose last member falls off the
/// calendar, before any row is built.
fn check_series_length(
    spec: &SeriesSpec,
    occurrences: u32,
    month_step: u32,
    due_day: DueDay,
) -> ServiceResult<()> {
    if occurrences > MAX_SERIES_OCCURRENCES {
        return Err(ObligationError::validation(format!(
            "a series may hold at most {} occurrences, got {}",
            MAX_SERIES_OCCURRENCES, occurrences
        )));
    }
    member_due_date(spec.due_date, month_step, occurrences - 1, due_day).map(|_| ())
}

fn build_series(
    spec: &SeriesSpec,
    due_day: DueDay,
    month_step: u32,
    amounts: Vec<Decimal>,
    installments: Option<NonZeroU32>,
) -> ServiceResult<Vec<Obligation>> {
    let head_id = Uuid::new_v4();
    let mut batch = Vec::with_capacity(amounts.len());

    for (index, amount) in amounts.into_iter().enumerate() {
        let position = index as u32;
        let due_date = member_due_date(spec.due_date, month_step, position, due_day)?;
        let id = if index == 0 { head_id } else { Uuid::new_v4() };
        let mut row = occurrence(spec, id, due_date, amount);
        row.due_day = Some(due_day.as_u8());
        row.parent_id = (index > 0).then_some(head_id);
        if let Some(total) = installments {
            let number = position + 1;
            row.installment_number = Some(number);
            row.total_installments = Some(total.get());
            row.description = format!("{} ({} of {})", spec.description.trim(), number, total);
        }
        batch.push(row);
    }

    Ok(batch)
}

fn member_due_date(
    first_due: NaiveDate,
    month_step: u32,
    position: u32,
    due_day: DueDay,
) -> ServiceResult<NaiveDate> {
    month_step
        .checked_mul(position)
        .and_then(|months| month_offset_on_day(first_due, months, due_day.get()))
        .ok_or_else(|| {
            ObligationError::validation(format!(
                "occurrence {} of series starting {} falls outside the supported calendar",
                position + 1,
                first_due
            ))
        })
}

fn occurrence(spec: &SeriesSpec, id: Uuid, due_date: NaiveDate, amount: Decimal) -> Obligation {
    Obligation {
        id,
        kind: spec.kind,
        counterpart_id: spec.counterpart_id,
        description: spec.description.trim().to_string(),
        category: spec.category.clone(),
        payment_method: spec.payment_method.clone(),
        notes: spec.notes.clone(),
        amount,
        issue_date: spec.issue_date,
        due_date,
        occurrence_type: spec.schedule.occurrence_type(),
        due_day: None,
        installment_number: None,
        total_installments: None,
        parent_id: None,
        status: ObligationStatus::Pending,
        payment_date: None,
        paid_amount: None,
    }
}
