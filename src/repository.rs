use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Booking, BookingDraft, BookingPatch, BookingStatus};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("snapshot at seq {expected} superseded by seq {actual}")]
    StaleSnapshot { expected: u64, actual: u64 },

    #[error("backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// A tenant's booking set plus the sequence number that guards writes
/// validated against it.
#[derive(Debug, Clone)]
pub struct BookingSnapshot {
    pub seq: u64,
    /// Ordered by `start_at`.
    pub bookings: Vec<Booking>,
}

/// Durable store contract. Writes are compare-and-swap on the tenant's
/// sequence number: a write carries the seq of the snapshot it was validated
/// against and fails with `StaleSnapshot` if any other write landed in
/// between. Either the commit happens against the exact set the caller
/// validated, or the caller re-reads and re-validates. The store assigns ids
/// and bookkeeping timestamps; deletion is not part of the scheduling
/// surface.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn snapshot(&self, school_id: Uuid) -> Result<BookingSnapshot, RepositoryError>;

    async fn insert(
        &self,
        expected_seq: u64,
        draft: BookingDraft,
        now: DateTime<Utc>,
    ) -> Result<Booking, RepositoryError>;

    async fn update(
        &self,
        school_id: Uuid,
        expected_seq: u64,
        id: Uuid,
        patch: BookingPatch,
        now: DateTime<Utc>,
    ) -> Result<Booking, RepositoryError>;
}

#[derive(Debug, Default)]
struct Shelf {
    seq: u64,
    bookings: Vec<Booking>,
}

/// Reference implementation of the repository contract, one shelf per
/// school. Backs the test suite and documents the CAS semantics a durable
/// store must reproduce.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    shelves: Mutex<HashMap<Uuid, Shelf>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryRepository {
    async fn snapshot(&self, school_id: Uuid) -> Result<BookingSnapshot, RepositoryError> {
        let shelves = self.shelves.lock().await;
        let snapshot = match shelves.get(&school_id) {
            Some(shelf) => BookingSnapshot {
                seq: shelf.seq,
                bookings: shelf.bookings.clone(),
            },
            None => BookingSnapshot {
                seq: 0,
                bookings: Vec::new(),
            },
        };
        Ok(snapshot)
    }

    async fn insert(
        &self,
        expected_seq: u64,
        draft: BookingDraft,
        now: DateTime<Utc>,
    ) -> Result<Booking, RepositoryError> {
        let mut shelves = self.shelves.lock().await;
        let shelf = shelves.entry(draft.school_id).or_default();
        if shelf.seq != expected_seq {
            return Err(RepositoryError::StaleSnapshot {
                expected: expected_seq,
                actual: shelf.seq,
            });
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            school_id: draft.school_id,
            student_id: draft.student_id,
            instructor_id: draft.instructor_id,
            vehicle_id: draft.vehicle_id,
            start_at: draft.start_at,
            end_at: draft.end_at,
            status: BookingStatus::Pending,
            lesson_type: draft.lesson_type,
            price_cents: draft.price_cents,
            pickup_location: draft.pickup_location,
            notes: draft.notes,
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        let pos = shelf
            .bookings
            .partition_point(|b| b.start_at <= booking.start_at);
        shelf.bookings.insert(pos, booking.clone());
        shelf.seq += 1;
        Ok(booking)
    }

    async fn update(
        &self,
        school_id: Uuid,
        expected_seq: u64,
        id: Uuid,
        patch: BookingPatch,
        now: DateTime<Utc>,
    ) -> Result<Booking, RepositoryError> {
        let mut shelves = self.shelves.lock().await;
        let shelf = shelves.entry(school_id).or_default();
        if shelf.seq != expected_seq {
            return Err(RepositoryError::StaleSnapshot {
                expected: expected_seq,
                actual: shelf.seq,
            });
        }

        let pos = shelf
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        let mut booking = shelf.bookings.remove(pos);
        patch.apply_to(&mut booking);
        booking.updated_at = now;

        let pos = shelf
            .bookings
            .partition_point(|b| b.start_at <= booking.start_at);
        shelf.bookings.insert(pos, booking.clone());
        shelf.seq += 1;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, 0, 0).unwrap()
    }

    fn draft(school_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingDraft {
        BookingDraft {
            school_id,
            student_id: Uuid::new_v4(),
            instructor_id: Uuid::new_v4(),
            vehicle_id: None,
            start_at: start,
            end_at: end,
            lesson_type: None,
            price_cents: None,
            pickup_location: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_starts_pending() {
        let repo = MemoryRepository::new();
        let school = Uuid::new_v4();
        let booking = repo
            .insert(0, draft(school, dt(10), dt(11)), dt(8))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.created_at, dt(8));
        assert_eq!(booking.updated_at, dt(8));

        let snap = repo.snapshot(school).await.unwrap();
        assert_eq!(snap.seq, 1);
        assert_eq!(snap.bookings.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_is_ordered_by_start() {
        let repo = MemoryRepository::new();
        let school = Uuid::new_v4();
        repo.insert(0, draft(school, dt(14), dt(15)), dt(8)).await.unwrap();
        repo.insert(1, draft(school, dt(9), dt(10)), dt(8)).await.unwrap();
        repo.insert(2, draft(school, dt(11), dt(12)), dt(8)).await.unwrap();

        let snap = repo.snapshot(school).await.unwrap();
        let starts: Vec<DateTime<Utc>> = snap.bookings.iter().map(|b| b.start_at).collect();
        assert_eq!(starts, [dt(9), dt(11), dt(14)]);
    }

    #[tokio::test]
    async fn stale_seq_is_rejected() {
        let repo = MemoryRepository::new();
        let school = Uuid::new_v4();
        repo.insert(0, draft(school, dt(10), dt(11)), dt(8)).await.unwrap();

        // A second writer still holding seq 0.
        let err = repo
            .insert(0, draft(school, dt(12), dt(13)), dt(8))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::StaleSnapshot { expected: 0, actual: 1 }
        ));
    }

    #[tokio::test]
    async fn update_patches_and_resorts() {
        let repo = MemoryRepository::new();
        let school = Uuid::new_v4();
        let first = repo.insert(0, draft(school, dt(9), dt(10)), dt(8)).await.unwrap();
        repo.insert(1, draft(school, dt(11), dt(12)), dt(8)).await.unwrap();

        let moved = repo
            .update(
                school,
                2,
                first.id,
                BookingPatch::reschedule(dt(14), dt(15)),
                dt(8),
            )
            .await
            .unwrap();
        assert_eq!(moved.start_at, dt(14));

        let snap = repo.snapshot(school).await.unwrap();
        assert_eq!(snap.seq, 3);
        assert_eq!(snap.bookings.last().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = MemoryRepository::new();
        let school = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let err = repo
            .update(school, 0, missing, BookingPatch::default(), dt(8))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn schools_are_isolated() {
        let repo = MemoryRepository::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        repo.insert(0, draft(a, dt(10), dt(11)), dt(8)).await.unwrap();

        let snap_b = repo.snapshot(b).await.unwrap();
        assert_eq!(snap_b.seq, 0);
        assert!(snap_b.bookings.is_empty());
    }
}
