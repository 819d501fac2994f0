//! Obligation domain models, schedule variants, and shared traits.

pub mod common;
pub mod obligation;
pub mod schedule;

pub use common::{Displayable, Identifiable};
pub use obligation::{
    DueState, Obligation, ObligationKind, ObligationPatch, ObligationStatus, OccurrenceType,
};
pub use schedule::{DueDay, RecurringPeriod, Schedule, SeriesRequest, SeriesSpec};
