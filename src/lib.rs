//! Lesson-booking scheduler for driving schools: conflict detection, the
//! booking status lifecycle, validated create/edit/drag-move paths, and
//! day/week/list calendar projection. Persistence lives behind the
//! [`repository::BookingRepository`] contract; the host wires in a durable
//! implementation and an API layer.

pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ScheduleConfig;
pub use errors::ScheduleError;
pub use models::{Booking, BookingDraft, BookingPatch, BookingStatus, Roster, StatusAction};
pub use repository::{BookingRepository, BookingSnapshot, MemoryRepository, RepositoryError};
pub use scheduler::Scheduler;
pub use services::calendar::{CalendarView, CalendarViewBuilder, ViewFilter, ViewKind};
pub use services::conflict::{find_conflict, SlotClaim};
pub use services::status::apply_action;
pub use services::validation::{validate, ScheduleOp};
