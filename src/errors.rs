use uuid::Uuid;

use crate::models::{BookingStatus, StatusAction};
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("lesson end must be after its start")]
    InvalidTimeRange,

    #[error("lesson cannot start in the past")]
    PastStart,

    #[error("time slot conflicts with booking {0}")]
    Conflict(Uuid),

    #[error("cannot {action} a {from} booking")]
    InvalidTransition {
        from: BookingStatus,
        action: StatusAction,
    },

    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl ScheduleError {
    /// Validation failures are surfaced to the user as form errors and are
    /// never retried; storage errors are the caller's to retry with backoff.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTimeRange
                | ScheduleError::PastStart
                | ScheduleError::Conflict(_)
                | ScheduleError::InvalidTransition { .. }
        )
    }
}
