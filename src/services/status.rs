use chrono::{DateTime, Utc};

use crate::errors::ScheduleError;
use crate::models::{Booking, BookingStatus, StatusAction};

/// Apply a lifecycle action, returning the updated booking. Transitions
/// outside the table are rejected; terminal statuses accept nothing.
///
/// | from      | action   | to        |
/// |-----------|----------|-----------|
/// | pending   | confirm  | confirmed |
/// | confirmed | complete | completed |
/// | pending   | cancel   | cancelled |
/// | confirmed | cancel   | cancelled |
pub fn apply_action(
    booking: &Booking,
    action: StatusAction,
    now: DateTime<Utc>,
) -> Result<Booking, ScheduleError> {
    let next = match (booking.status, action) {
        (BookingStatus::Pending, StatusAction::Confirm) => BookingStatus::Confirmed,
        (BookingStatus::Confirmed, StatusAction::Complete) => BookingStatus::Completed,
        (BookingStatus::Pending | BookingStatus::Confirmed, StatusAction::Cancel) => {
            BookingStatus::Cancelled
        }
        (from, action) => return Err(ScheduleError::InvalidTransition { from, action }),
    };

    let mut updated = booking.clone();
    updated.status = next;
    updated.updated_at = now;
    match next {
        BookingStatus::Confirmed => updated.confirmed_at = Some(now),
        BookingStatus::Completed => updated.completed_at = Some(now),
        BookingStatus::Cancelled => updated.cancelled_at = Some(now),
        _ => {}
    }
    Ok(updated)
}
