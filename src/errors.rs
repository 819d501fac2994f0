use thiserror::Error;
use uuid::Uuid;

use crate::domain::ObligationStatus;
use crate::utils::persistence::JsonFileError;

/// Failures raised by an occurrence store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Duplicate obligation id: {0}")]
    DuplicateId(Uuid),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Error type that captures engine failures surfaced to calling layers.
#[derive(Debug, Error)]
pub enum ObligationError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Obligation not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: ObligationStatus,
        to: ObligationStatus,
    },
    #[error(
        "Series head {head_id} was stored without its children ({source}); removing it failed: {rollback}"
    )]
    PartialSeries {
        head_id: Uuid,
        #[source]
        source: StoreError,
        rollback: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ObligationError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ObligationError::Validation(message.into())
    }
}

impl From<JsonFileError> for StoreError {
    fn from(err: JsonFileError) -> Self {
        match err {
            JsonFileError::Io(io) => StoreError::Io(io),
            JsonFileError::Serde(serde) => StoreError::Serde(serde),
        }
    }
}
