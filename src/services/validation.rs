use chrono::{DateTime, Utc};

use crate::errors::ScheduleError;
use crate::models::Booking;
use crate::services::conflict::{find_conflict, SlotClaim};

/// Which mutation path is being validated. `Move` is the drag-drop
/// reschedule; `Update` is the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOp {
    Create,
    Update,
    Move,
}

/// One pass/fail decision for a mutation request, short-circuiting on the
/// first failure: range, then past-start, then conflicts.
///
/// `previous` is the stored booking for `Update`/`Move` and `None` for
/// `Create`. The past check applies to creates and to edits that moved the
/// time window; editing only descriptive fields of a lesson that already
/// started stays legal.
pub fn validate(
    op: ScheduleOp,
    claim: &SlotClaim,
    previous: Option<&Booking>,
    bookings: &[Booking],
    now: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    if claim.end_at <= claim.start_at {
        return Err(ScheduleError::InvalidTimeRange);
    }

    let window_changed = match (op, previous) {
        (ScheduleOp::Create, _) => true,
        (_, Some(prev)) => prev.start_at != claim.start_at || prev.end_at != claim.end_at,
        (_, None) => true,
    };
    if window_changed && claim.start_at < now {
        return Err(ScheduleError::PastStart);
    }

    if let Some(hit) = find_conflict(claim, bookings) {
        return Err(ScheduleError::Conflict(hit.id));
    }

    Ok(())
}
