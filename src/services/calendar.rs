use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ScheduleConfig;
use crate::models::{Booking, BookingStatus, Roster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Week,
    Day,
    List,
}

/// Presentation filters. Search is a case-insensitive substring match over
/// student name, instructor name, pickup location, and notes.
#[derive(Debug, Clone, Default)]
pub struct ViewFilter {
    pub instructor_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

impl ViewFilter {
    pub fn for_instructor(instructor_id: Uuid) -> Self {
        Self {
            instructor_id: Some(instructor_id),
            ..Self::default()
        }
    }

    fn matches(&self, booking: &Booking, roster: &Roster) -> bool {
        if let Some(id) = self.instructor_id {
            if booking.instructor_id != id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }
        if let Some(ref query) = self.search {
            let query = query.trim().to_lowercase();
            if !query.is_empty() {
                let student = roster.student_name(booking.student_id);
                let instructor = roster.instructor_name(booking.instructor_id);
                let hit = [
                    student,
                    instructor,
                    booking.pickup_location.as_deref(),
                    booking.notes.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&query));
                if !hit {
                    return false;
                }
            }
        }
        true
    }
}

/// One 30-minute (by default) cell of the grid. A booking appears in every
/// cell its interval overlaps.
#[derive(Debug, Clone, Serialize)]
pub struct SlotCell {
    pub starts_at: NaiveTime,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub slots: Vec<SlotCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub days: Vec<DayBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorColumn {
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub slots: Vec<SlotCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub columns: Vec<InstructorColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub groups: Vec<DateGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub enum CalendarView {
    Week(WeekView),
    Day(DayView),
    List(ListView),
}

/// Pure projection of a booking snapshot into calendar structures. Dates and
/// slot times are in the tenant-local offset from `ScheduleConfig`; input
/// bookings are never mutated.
pub struct CalendarViewBuilder<'a> {
    config: &'a ScheduleConfig,
    roster: &'a Roster,
}

impl<'a> CalendarViewBuilder<'a> {
    pub fn new(config: &'a ScheduleConfig, roster: &'a Roster) -> Self {
        Self { config, roster }
    }

    pub fn build(
        &self,
        kind: ViewKind,
        bookings: &[Booking],
        filter: &ViewFilter,
        anchor: NaiveDate,
    ) -> CalendarView {
        match kind {
            ViewKind::Week => CalendarView::Week(self.week_view(bookings, filter, anchor)),
            ViewKind::Day => CalendarView::Day(self.day_view(bookings, filter, anchor)),
            ViewKind::List => CalendarView::List(self.list_view(bookings, filter)),
        }
    }

    /// Seven day buckets for the week containing `anchor`, starting on the
    /// configured weekday, each carrying the full slot grid.
    pub fn week_view(&self, bookings: &[Booking], filter: &ViewFilter, anchor: NaiveDate) -> WeekView {
        let filtered = self.filtered(bookings, filter);
        let first = week_start(anchor, self.config.week_start);

        let days = (0..7)
            .map(|i| {
                let date = first + Duration::days(i);
                DayBucket {
                    date,
                    slots: self.day_slots(&filtered, date, |_| true),
                }
            })
            .collect();
        WeekView { days }
    }

    /// The anchor day only, one slot column per instructor: the selected one,
    /// or every roster instructor flagged active.
    pub fn day_view(&self, bookings: &[Booking], filter: &ViewFilter, anchor: NaiveDate) -> DayView {
        let filtered = self.filtered(bookings, filter);

        let instructors: Vec<(Uuid, String)> = match filter.instructor_id {
            Some(id) => {
                let name = self
                    .roster
                    .instructor_name(id)
                    .unwrap_or("(unknown)")
                    .to_string();
                vec![(id, name)]
            }
            None => self
                .roster
                .active_instructors()
                .into_iter()
                .map(|i| (i.id, i.name.clone()))
                .collect(),
        };

        let columns = instructors
            .into_iter()
            .map(|(instructor_id, instructor_name)| InstructorColumn {
                instructor_id,
                instructor_name,
                slots: self.day_slots(&filtered, anchor, |b| b.instructor_id == instructor_id),
            })
            .collect();

        DayView {
            date: anchor,
            columns,
        }
    }

    /// Filtered bookings grouped by local calendar date, dates ascending,
    /// each group sorted by start time. Every booking lands in exactly one
    /// group.
    pub fn list_view(&self, bookings: &[Booking], filter: &ViewFilter) -> ListView {
        let mut grouped: std::collections::BTreeMap<NaiveDate, Vec<Booking>> =
            std::collections::BTreeMap::new();
        for booking in self.filtered(bookings, filter) {
            let date = self.local(booking.start_at).date();
            grouped.entry(date).or_default().push(booking);
        }

        let groups = grouped
            .into_iter()
            .map(|(date, mut bookings)| {
                bookings.sort_by_key(|b| (b.start_at, b.id));
                DateGroup { date, bookings }
            })
            .collect();
        ListView { groups }
    }

    fn filtered(&self, bookings: &[Booking], filter: &ViewFilter) -> Vec<Booking> {
        bookings
            .iter()
            .filter(|b| filter.matches(b, self.roster))
            .cloned()
            .collect()
    }

    /// The slot grid for one local date; `keep` narrows per-column.
    fn day_slots<F>(&self, bookings: &[Booking], date: NaiveDate, keep: F) -> Vec<SlotCell>
    where
        F: Fn(&Booking) -> bool,
    {
        let step = Duration::minutes(self.config.slot_minutes as i64);
        self.config
            .slot_starts()
            .into_iter()
            .map(|starts_at| {
                let slot_start = date.and_time(starts_at);
                let slot_end = slot_start + step;
                let bookings = bookings
                    .iter()
                    .filter(|b| keep(b) && self.overlaps_local(b, slot_start, slot_end))
                    .cloned()
                    .collect();
                SlotCell { starts_at, bookings }
            })
            .collect()
    }

    fn overlaps_local(&self, booking: &Booking, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let b_start = self.local(booking.start_at);
        let b_end = self.local(booking.end_at);
        b_start < end && start < b_end
    }

    fn local(&self, at: chrono::DateTime<chrono::Utc>) -> NaiveDateTime {
        at.with_timezone(&self.config.tz_offset).naive_local()
    }
}

fn week_start(anchor: NaiveDate, start: chrono::Weekday) -> NaiveDate {
    let back = (7 + anchor.weekday().num_days_from_monday() - start.num_days_from_monday()) % 7;
    anchor - Duration::days(back as i64)
}
