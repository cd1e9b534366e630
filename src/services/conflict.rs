use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Booking;

/// The resources and time window a booking request wants to claim.
#[derive(Debug, Clone, Copy)]
pub struct SlotClaim {
    /// Id of the booking being edited, ignored while scanning. None on create.
    pub booking_id: Option<Uuid>,
    pub instructor_id: Uuid,
    pub student_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl SlotClaim {
    pub fn for_booking(booking: &Booking) -> Self {
        Self {
            booking_id: Some(booking.id),
            instructor_id: booking.instructor_id,
            student_id: booking.student_id,
            start_at: booking.start_at,
            end_at: booking.end_at,
        }
    }
}

/// Scan `bookings` in input order and return the first one that claims the
/// same instructor or student and overlaps the half-open window. Touching
/// intervals (end == start) do not overlap. Cancelled and no-show bookings
/// no longer occupy their slot and are skipped.
pub fn find_conflict<'a>(claim: &SlotClaim, bookings: &'a [Booking]) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        Some(b.id) != claim.booking_id
            && b.status.occupies_slot()
            && b.claims(claim.instructor_id, claim.student_id)
            && b.overlaps(claim.start_at, claim.end_at)
    })
}
