//! Domain models for dated payable and receivable occurrences.

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Displayable, Identifiable};
use crate::errors::ObligationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Distinguishes accounts-payable rows from accounts-receivable rows.
pub enum ObligationKind {
    Payable,
    Receivable,
}

impl ObligationKind {
    /// Terminal status reached once an occurrence of this kind is settled.
    pub fn settled_status(self) -> ObligationStatus {
        match self {
            ObligationKind::Payable => ObligationStatus::Paid,
            ObligationKind::Receivable => ObligationStatus::Received,
        }
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ObligationKind::Payable => "payable",
            ObligationKind::Receivable => "receivable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
/// Enumerates the stored lifecycle state of an occurrence.
pub enum ObligationStatus {
    #[default]
    Pending,
    Paid,
    Received,
    Canceled,
}

impl ObligationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ObligationStatus::Pending)
    }

    /// Only `pending` has outgoing edges; every other state is terminal.
    pub fn can_transition_to(self, next: ObligationStatus) -> bool {
        matches!(
            (self, next),
            (ObligationStatus::Pending, ObligationStatus::Paid)
                | (ObligationStatus::Pending, ObligationStatus::Received)
                | (ObligationStatus::Pending, ObligationStatus::Canceled)
        )
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ObligationStatus::Pending => "pending",
            ObligationStatus::Paid => "paid",
            ObligationStatus::Received => "received",
            ObligationStatus::Canceled => "canceled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Persisted occurrence type. Names follow the stored column values.
pub enum OccurrenceType {
    Unica,
    Mensal,
    Trimestral,
    Semestral,
    Anual,
    Parcelada,
}

impl OccurrenceType {
    pub const ALL: [OccurrenceType; 6] = [
        OccurrenceType::Unica,
        OccurrenceType::Mensal,
        OccurrenceType::Trimestral,
        OccurrenceType::Semestral,
        OccurrenceType::Anual,
        OccurrenceType::Parcelada,
    ];

    /// Months between consecutive members of a series, `None` for one-off rows.
    pub fn month_step(self) -> Option<u32> {
        match self {
            OccurrenceType::Unica => None,
            OccurrenceType::Mensal | OccurrenceType::Parcelada => Some(1),
            OccurrenceType::Trimestral => Some(3),
            OccurrenceType::Semestral => Some(6),
            OccurrenceType::Anual => Some(12),
        }
    }

    pub fn is_series(self) -> bool {
        !matches!(self, OccurrenceType::Unica)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OccurrenceType::Unica => "unica",
            OccurrenceType::Mensal => "mensal",
            OccurrenceType::Trimestral => "trimestral",
            OccurrenceType::Semestral => "semestral",
            OccurrenceType::Anual => "anual",
            OccurrenceType::Parcelada => "parcelada",
        }
    }
}

impl fmt::Display for OccurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OccurrenceType {
    type Err = ObligationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        OccurrenceType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                ObligationError::validation(format!("unknown occurrence type `{}`", value))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Derived, display-only urgency of a pending occurrence.
pub enum DueState {
    Overdue,
    DueSoon,
    Upcoming,
}

impl DueState {
    fn classify(due_date: NaiveDate, reference: NaiveDate, due_soon_days: i64) -> DueState {
        if due_date < reference {
            return DueState::Overdue;
        }
        let cutoff = reference + Duration::days(due_soon_days);
        if due_date <= cutoff {
            DueState::DueSoon
        } else {
            DueState::Upcoming
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obligation {
    pub id: Uuid,
    pub kind: ObligationKind,
    /// Supplier for payables, client for receivables.
    pub counterpart_id: Uuid,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub occurrence_type: OccurrenceType,
    #[serde(default)]
    pub due_day: Option<u8>,
    #[serde(default)]
    pub installment_number: Option<u32>,
    #[serde(default)]
    pub total_installments: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub status: ObligationStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_amount: Option<Decimal>,
}

impl Obligation {
    /// A head originates a series; one-off rows are heads of nothing.
    pub fn is_head(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Identifier of the series head this row belongs to (itself when it is the head).
    pub fn series_root(&self) -> Uuid {
        self.parent_id.unwrap_or(self.id)
    }

    pub fn is_pending(&self) -> bool {
        self.status == ObligationStatus::Pending
    }

    /// Classifies a pending row relative to `reference`; settled or canceled rows
    /// have no due state.
    pub fn due_state(&self, reference: NaiveDate, due_soon_days: i64) -> Option<DueState> {
        if !self.is_pending() {
            return None;
        }
        Some(DueState::classify(self.due_date, reference, due_soon_days))
    }

    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        self.is_pending() && self.due_date < reference
    }
}

impl Identifiable for Obligation {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Obligation {
    fn display_label(&self) -> String {
        format!(
            "{}:{} {} due {} [{}]",
            self.kind, self.id, self.description, self.due_date, self.status
        )
    }
}

/// Partial update applied to one or more stored occurrences. `None` leaves the
/// column untouched. Structural columns (id, parent link, installment numbering,
/// occurrence type) are never patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObligationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObligationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
}

impl ObligationPatch {
    /// Patch recording a status change together with its settlement details.
    pub fn settlement(
        status: ObligationStatus,
        payment_date: Option<NaiveDate>,
        paid_amount: Option<Decimal>,
    ) -> Self {
        Self {
            status: Some(status),
            payment_date,
            paid_amount,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn touches_settlement(&self) -> bool {
        self.status.is_some() || self.payment_date.is_some() || self.paid_amount.is_some()
    }

    pub fn apply_to(&self, target: &mut Obligation) {
        if let Some(counterpart_id) = self.counterpart_id {
            target.counterpart_id = counterpart_id;
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        if let Some(category) = &self.category {
            target.category = Some(category.clone());
        }
        if let Some(method) = &self.payment_method {
            target.payment_method = Some(method.clone());
        }
        if let Some(notes) = &self.notes {
            target.notes = Some(notes.clone());
        }
        if let Some(amount) = self.amount {
            target.amount = amount;
        }
        if let Some(issue_date) = self.issue_date {
            target.issue_date = issue_date;
        }
        if let Some(due_date) = self.due_date {
            target.due_date = due_date;
        }
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(payment_date) = self.payment_date {
            target.payment_date = Some(payment_date);
        }
        if let Some(paid_amount) = self.paid_amount {
            target.paid_amount = Some(paid_amount);
        }
    }
}
