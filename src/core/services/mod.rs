pub mod scope_service;
pub mod series_service;
pub mod status_service;
pub mod summary_service;

pub use scope_service::{BulkScope, ScopeService};
pub use series_service::SeriesService;
pub use status_service::StatusService;
pub use summary_service::{SeriesSnapshot, SummaryService};

use crate::errors::ObligationError;

pub type ServiceResult<T> = Result<T, ObligationError>;
