pub mod booking;
pub mod roster;

pub use booking::{Booking, BookingDraft, BookingPatch, BookingStatus, StatusAction};
pub use roster::{Instructor, Roster, Student, Vehicle};
