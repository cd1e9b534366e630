use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::ScheduleConfig;
use crate::errors::ScheduleError;
use crate::models::{Booking, BookingDraft, BookingPatch, BookingStatus, Roster, StatusAction};
use crate::repository::{BookingRepository, RepositoryError};
use crate::services::calendar::{CalendarView, CalendarViewBuilder, ViewFilter, ViewKind};
use crate::services::conflict::SlotClaim;
use crate::services::status;
use crate::services::validation::{validate, ScheduleOp};

/// The commit engine: every mutation reads a snapshot, validates against it,
/// and writes with the snapshot's sequence number. A concurrent writer makes
/// the write fail stale, and the whole read-validate-write cycle reruns, so
/// no booking ever commits against a set it was not validated on.
pub struct Scheduler<R: BookingRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    config: ScheduleConfig,
}

impl<R: BookingRepository> Scheduler<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, config: ScheduleConfig) -> Self {
        Self { repo, clock, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Create a new pending booking.
    pub async fn schedule(&self, draft: BookingDraft) -> Result<Booking, ScheduleError> {
        let mut attempt = 0;
        loop {
            let snap = self.repo.snapshot(draft.school_id).await?;
            let claim = SlotClaim {
                booking_id: None,
                instructor_id: draft.instructor_id,
                student_id: draft.student_id,
                start_at: draft.start_at,
                end_at: draft.end_at,
            };
            validate(ScheduleOp::Create, &claim, None, &snap.bookings, self.clock.now())?;

            match self.repo.insert(snap.seq, draft.clone(), self.clock.now()).await {
                Ok(booking) => {
                    tracing::info!(
                        booking = %booking.id,
                        instructor = %booking.instructor_id,
                        start = %booking.start_at,
                        "lesson scheduled"
                    );
                    return Ok(booking);
                }
                Err(e) => self.bail_or_retry(e, &mut attempt)?,
            }
        }
    }

    /// Drag-drop reschedule: move a booking to a new time window.
    pub async fn reschedule(
        &self,
        school_id: Uuid,
        id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Booking, ScheduleError> {
        let patch = BookingPatch::reschedule(start_at, end_at);
        self.commit_edit(school_id, id, patch, ScheduleOp::Move).await
    }

    /// Edit a booking: times, resources, descriptive fields. Status changes
    /// go through `apply_status`; status fields on the patch are ignored.
    pub async fn update(
        &self,
        school_id: Uuid,
        id: Uuid,
        mut patch: BookingPatch,
    ) -> Result<Booking, ScheduleError> {
        patch.status = None;
        patch.confirmed_at = None;
        patch.completed_at = None;
        patch.cancelled_at = None;
        self.commit_edit(school_id, id, patch, ScheduleOp::Update).await
    }

    async fn commit_edit(
        &self,
        school_id: Uuid,
        id: Uuid,
        patch: BookingPatch,
        op: ScheduleOp,
    ) -> Result<Booking, ScheduleError> {
        let mut attempt = 0;
        loop {
            let snap = self.repo.snapshot(school_id).await?;
            let stored = snap
                .bookings
                .iter()
                .find(|b| b.id == id)
                .ok_or(ScheduleError::NotFound(id))?;

            let mut candidate = stored.clone();
            patch.apply_to(&mut candidate);
            let claim = SlotClaim::for_booking(&candidate);
            validate(op, &claim, Some(stored), &snap.bookings, self.clock.now())?;

            match self
                .repo
                .update(school_id, snap.seq, id, patch.clone(), self.clock.now())
                .await
            {
                Ok(booking) => {
                    tracing::info!(
                        booking = %booking.id,
                        start = %booking.start_at,
                        "lesson updated"
                    );
                    return Ok(booking);
                }
                Err(e) => self.bail_or_retry(e, &mut attempt)?,
            }
        }
    }

    /// Run a lifecycle action through the status machine and persist it.
    pub async fn apply_status(
        &self,
        school_id: Uuid,
        id: Uuid,
        action: StatusAction,
    ) -> Result<Booking, ScheduleError> {
        let mut attempt = 0;
        loop {
            let snap = self.repo.snapshot(school_id).await?;
            let stored = snap
                .bookings
                .iter()
                .find(|b| b.id == id)
                .ok_or(ScheduleError::NotFound(id))?;

            let updated = status::apply_action(stored, action, self.clock.now())?;
            let patch = BookingPatch {
                status: Some(updated.status),
                confirmed_at: updated.confirmed_at,
                completed_at: updated.completed_at,
                cancelled_at: updated.cancelled_at,
                ..BookingPatch::default()
            };

            match self
                .repo
                .update(school_id, snap.seq, id, patch, self.clock.now())
                .await
            {
                Ok(booking) => {
                    tracing::info!(booking = %booking.id, status = %booking.status, "status changed");
                    return Ok(booking);
                }
                Err(e) => self.bail_or_retry(e, &mut attempt)?,
            }
        }
    }

    /// Mark confirmed lessons whose end passed more than the configured grace
    /// ago as no-shows. Pending lessons are left for a human to cancel.
    pub async fn sweep_no_shows(&self, school_id: Uuid) -> Result<Vec<Uuid>, ScheduleError> {
        let grace = Duration::minutes(self.config.no_show_grace_minutes);
        let mut swept = Vec::new();
        loop {
            let now = self.clock.now();
            let snap = self.repo.snapshot(school_id).await?;
            let due = snap
                .bookings
                .iter()
                .find(|b| b.status == BookingStatus::Confirmed && b.end_at + grace <= now);
            let Some(booking) = due else {
                return Ok(swept);
            };

            let patch = BookingPatch {
                status: Some(BookingStatus::NoShow),
                ..BookingPatch::default()
            };
            match self.repo.update(school_id, snap.seq, booking.id, patch, now).await {
                Ok(marked) => {
                    tracing::warn!(booking = %marked.id, end = %marked.end_at, "marked as no-show");
                    swept.push(marked.id);
                }
                // Someone else wrote; re-snapshot and keep sweeping.
                Err(RepositoryError::StaleSnapshot { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Project the current booking set into a calendar view.
    pub async fn calendar(
        &self,
        school_id: Uuid,
        kind: ViewKind,
        filter: &ViewFilter,
        anchor: NaiveDate,
        roster: &Roster,
    ) -> Result<CalendarView, ScheduleError> {
        let snap = self.repo.snapshot(school_id).await?;
        let builder = CalendarViewBuilder::new(&self.config, roster);
        Ok(builder.build(kind, &snap.bookings, filter, anchor))
    }

    fn bail_or_retry(&self, err: RepositoryError, attempt: &mut u32) -> Result<(), ScheduleError> {
        match err {
            RepositoryError::StaleSnapshot { expected, actual }
                if *attempt < self.config.commit_retries =>
            {
                *attempt += 1;
                tracing::warn!(
                    expected,
                    actual,
                    attempt = *attempt,
                    "snapshot went stale during commit, revalidating"
                );
                Ok(())
            }
            RepositoryError::NotFound(id) => Err(ScheduleError::NotFound(id)),
            e => Err(e.into()),
        }
    }
}
