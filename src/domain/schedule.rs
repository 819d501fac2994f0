//! Schedule variants and the requests that create obligation series.

use std::{fmt, num::NonZeroU32};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::obligation::{ObligationKind, OccurrenceType};
use crate::{config::MAX_SERIES_OCCURRENCES, errors::ObligationError};

/// Day of month (1..=31) that every member of a series is forced onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DueDay(u8);

impl DueDay {
    pub fn new(day: u32) -> Result<Self, ObligationError> {
        match u8::try_from(day) {
            Ok(value @ 1..=31) => Ok(DueDay(value)),
            _ => Err(ObligationError::validation(format!(
                "due_day must be between 1 and 31, got {}",
                day
            ))),
        }
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for DueDay {
    type Error = ObligationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        DueDay::new(value)
    }
}

impl From<DueDay> for u32 {
    fn from(day: DueDay) -> Self {
        day.get()
    }
}

impl fmt::Display for DueDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Cadence of a fixed-amount recurring series.
pub enum RecurringPeriod {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl RecurringPeriod {
    pub fn months(self) -> u32 {
        match self {
            RecurringPeriod::Monthly => 1,
            RecurringPeriod::Quarterly => 3,
            RecurringPeriod::SemiAnnual => 6,
            RecurringPeriod::Annual => 12,
        }
    }

    pub fn occurrence_type(self) -> OccurrenceType {
        match self {
            RecurringPeriod::Monthly => OccurrenceType::Mensal,
            RecurringPeriod::Quarterly => OccurrenceType::Trimestral,
            RecurringPeriod::SemiAnnual => OccurrenceType::Semestral,
            RecurringPeriod::Annual => OccurrenceType::Anual,
        }
    }

    pub fn from_occurrence_type(kind: OccurrenceType) -> Option<Self> {
        match kind {
            OccurrenceType::Mensal => Some(RecurringPeriod::Monthly),
            OccurrenceType::Trimestral => Some(RecurringPeriod::Quarterly),
            OccurrenceType::Semestral => Some(RecurringPeriod::SemiAnnual),
            OccurrenceType::Anual => Some(RecurringPeriod::Annual),
            OccurrenceType::Unica | OccurrenceType::Parcelada => None,
        }
    }
}

/// How a creation request expands into dated occurrences. Each variant carries
/// exactly the fields its occurrence type requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Single,
    Recurring {
        period: RecurringPeriod,
        due_day: DueDay,
    },
    Installments {
        count: NonZeroU32,
        due_day: DueDay,
    },
}

impl Schedule {
    pub fn occurrence_type(&self) -> OccurrenceType {
        match self {
            Schedule::Single => OccurrenceType::Unica,
            Schedule::Recurring { period, .. } => period.occurrence_type(),
            Schedule::Installments { .. } => OccurrenceType::Parcelada,
        }
    }

    pub fn due_day(&self) -> Option<DueDay> {
        match self {
            Schedule::Single => None,
            Schedule::Recurring { due_day, .. } | Schedule::Installments { due_day, .. } => {
                Some(*due_day)
            }
        }
    }

    pub fn month_step(&self) -> Option<u32> {
        self.occurrence_type().month_step()
    }
}

/// Validated input to the series generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub kind: ObligationKind,
    pub counterpart_id: Uuid,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Per-occurrence amount for recurring schedules, total amount for installments.
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    /// First due date of the series.
    pub due_date: NaiveDate,
    pub schedule: Schedule,
}

impl SeriesSpec {
    pub fn new(
        kind: ObligationKind,
        counterpart_id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        schedule: Schedule,
    ) -> Self {
        Self {
            kind,
            counterpart_id,
            description: description.into(),
            category: None,
            payment_method: None,
            notes: None,
            amount,
            issue_date,
            due_date,
            schedule,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Loosely-typed creation request as submitted by forms and APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub kind: ObligationKind,
    pub counterpart_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub occurrence_type: OccurrenceType,
    #[serde(default)]
    pub due_day: Option<u32>,
    #[serde(default)]
    pub installments: Option<u32>,
}

impl TryFrom<SeriesRequest> for SeriesSpec {
    type Error = ObligationError;

    fn try_from(request: SeriesRequest) -> Result<Self, Self::Error> {
        let schedule = match request.occurrence_type {
            OccurrenceType::Unica => Schedule::Single,
            OccurrenceType::Parcelada => {
                let due_day = require_due_day(request.due_day, request.occurrence_type)?;
                let count = request
                    .installments
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| {
                        ObligationError::validation("installments must be at least 1 for parcelada")
                    })?;
                if count.get() > MAX_SERIES_OCCURRENCES {
                    return Err(ObligationError::validation(format!(
                        "installments must not exceed {}, got {}",
                        MAX_SERIES_OCCURRENCES, count
                    )));
                }
                Schedule::Installments { count, due_day }
            }
            other => {
                let due_day = require_due_day(request.due_day, other)?;
                let period = RecurringPeriod::from_occurrence_type(other).ok_or_else(|| {
                    ObligationError::validation(format!("{} is not a recurring type", other))
                })?;
                Schedule::Recurring { period, due_day }
            }
        };

        Ok(SeriesSpec {
            kind: request.kind,
            counterpart_id: request.counterpart_id,
            description: request.description,
            category: request.category,
            payment_method: request.payment_method,
            notes: request.notes,
            amount: request.amount,
            issue_date: request.issue_date,
            due_date: request.due_date,
            schedule,
        })
    }
}

fn require_due_day(value: Option<u32>, kind: OccurrenceType) -> Result<DueDay, ObligationError> {
    let day = value.ok_or_else(|| {
        ObligationError::validation(format!("due_day is required for {}", kind))
    })?;
    DueDay::new(day)
}
