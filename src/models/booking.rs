use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub lesson_type: Option<String>,
    pub price_cents: Option<i64>,
    pub pickup_location: Option<String>,
    pub notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_at < end && start < self.end_at
    }

    /// True if this booking claims the given instructor or student.
    pub fn claims(&self, instructor_id: Uuid, student_id: Uuid) -> bool {
        self.instructor_id == instructor_id || self.student_id == student_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            "no_show" => BookingStatus::NoShow,
            _ => BookingStatus::Pending,
        }
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    /// Whether a booking in this status still blocks its time slot.
    /// Cancelled and no-show lessons free the slot for rebooking.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing lifecycle actions. `no_show` is not reachable here; the
/// no-show sweep sets it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Confirm,
    Complete,
    Cancel,
}

impl std::fmt::Display for StatusAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusAction::Confirm => "confirm",
            StatusAction::Complete => "complete",
            StatusAction::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// Everything a caller supplies to create a booking. The repository assigns
/// the id and bookkeeping timestamps; status always starts as `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub instructor_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub lesson_type: Option<String>,
    pub price_cents: Option<i64>,
    pub pickup_location: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: Option<BookingStatus>,
    pub lesson_type: Option<String>,
    pub price_cents: Option<i64>,
    pub pickup_location: Option<String>,
    pub notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl BookingPatch {
    pub fn reschedule(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: Some(end_at),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(v) = self.student_id {
            booking.student_id = v;
        }
        if let Some(v) = self.instructor_id {
            booking.instructor_id = v;
        }
        if let Some(v) = self.vehicle_id {
            booking.vehicle_id = Some(v);
        }
        if let Some(v) = self.start_at {
            booking.start_at = v;
        }
        if let Some(v) = self.end_at {
            booking.end_at = v;
        }
        if let Some(v) = self.status {
            booking.status = v;
        }
        if let Some(ref v) = self.lesson_type {
            booking.lesson_type = Some(v.clone());
        }
        if let Some(v) = self.price_cents {
            booking.price_cents = Some(v);
        }
        if let Some(ref v) = self.pickup_location {
            booking.pickup_location = Some(v.clone());
        }
        if let Some(ref v) = self.notes {
            booking.notes = Some(v.clone());
        }
        if let Some(v) = self.confirmed_at {
            booking.confirmed_at = Some(v);
        }
        if let Some(v) = self.completed_at {
            booking.completed_at = Some(v);
        }
        if let Some(v) = self.cancelled_at {
            booking.cancelled_at = Some(v);
        }
    }
}
