use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use cinebook_catalog::pricing;
use cinebook_core::clock::Clock;
use cinebook_core::events::{BookingEvent, NotificationPort};
use cinebook_core::payment::PaymentMethod;
use cinebook_core::seat::SeatId;

use crate::error::BookingError;
use crate::expiry::HoldExpiryManager;
use crate::model::{Requester, Reservation, ReservationStatus};
use crate::ports::{ReservationStore, ScreeningDirectory};
use crate::screening_lock::ScreeningLocks;
use crate::seat_map::SeatAvailability;

/// Tunable business rules for the engine.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// How long an unconfirmed hold claims its seats.
    pub hold_ttl: Duration,
}

impl BookingPolicy {
    pub fn from_seconds(hold_ttl_seconds: i64) -> Self {
        Self {
            hold_ttl: Duration::seconds(hold_ttl_seconds),
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::from_seconds(600)
    }
}

/// Seat status entry of a per-screening availability view.
#[derive(Debug, Clone, Serialize)]
pub struct SeatStatus {
    pub seat: SeatId,
    pub availability: SeatAvailability,
}

/// The state-machine authority over seat holds and reservations.
///
/// Every mutating operation follows the same shape: acquire the screening's
/// lock, validate against the seat map, apply the in-memory transition,
/// persist inside the critical section (rolling the transition back if the
/// write fails), then release the lock and announce the change. The periodic
/// expiry sweep serializes through the same locks — it is not a privileged
/// writer.
pub struct ReservationEngine {
    directory: Arc<dyn ScreeningDirectory>,
    store: Arc<dyn ReservationStore>,
    notifier: Arc<dyn NotificationPort>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
    locks: ScreeningLocks,
    expiry: Mutex<HoldExpiryManager>,
}

impl ReservationEngine {
    pub fn new(
        directory: Arc<dyn ScreeningDirectory>,
        store: Arc<dyn ReservationStore>,
        notifier: Arc<dyn NotificationPort>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            directory,
            store,
            notifier,
            clock,
            policy,
            locks: ScreeningLocks::new(),
            expiry: Mutex::new(HoldExpiryManager::new()),
        }
    }

    /// Place a temporary claim on `seats` for one screening.
    ///
    /// The whole request is granted or rejected: if any seat is unavailable
    /// the call fails with `SeatConflict` naming that seat and no seat state
    /// changes.
    pub async fn create_hold(
        &self,
        screening_id: Uuid,
        requester: Requester,
        seats: Vec<SeatId>,
    ) -> Result<Reservation, BookingError> {
        if seats.is_empty() {
            return Err(BookingError::EmptySeatSelection);
        }
        let mut seats = seats;
        seats.sort();
        seats.dedup();

        let screening = self.screening(screening_id).await?;
        let auditorium = self
            .directory
            .get_auditorium(screening.auditorium_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("auditorium {}", screening.auditorium_id)))?;
        for seat in &seats {
            if !auditorium.contains(seat) {
                return Err(BookingError::UnknownSeat(seat.clone()));
            }
        }

        let quote = pricing::quote(&screening, &seats);

        let map = self.locks.entry(screening_id).await;
        let mut map = map.lock().await;

        let now = self.clock.now();
        let expires_at = now + self.policy.hold_ttl;
        let reservation = Reservation::new(
            screening_id,
            requester,
            seats.clone(),
            quote.total_cents,
            quote.currency,
            now,
            expires_at,
        );

        map.mark_held(&seats, reservation.id, expires_at, now)?;
        if let Err(e) = self.store.save(&reservation).await {
            map.release(&seats, reservation.id);
            return Err(BookingError::Persistence(e.to_string()));
        }
        self.expiry
            .lock()
            .await
            .register(reservation.id, screening_id, expires_at);
        drop(map);

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            screening_id = %screening_id,
            seats = reservation.seats.len(),
            "Seats held"
        );
        self.publish(BookingEvent::SeatsHeld {
            screening_id,
            reservation_id: reservation.id,
            seats: reservation.seats.clone(),
            expires_at,
        })
        .await;

        Ok(reservation)
    }

    /// Promote a pending hold to a confirmed booking.
    ///
    /// Fails with `HoldExpired` if the TTL has elapsed — in that case the
    /// reservation is expired and its seats freed before the error returns,
    /// so the seats are immediately holdable by someone else.
    pub async fn confirm(
        &self,
        reservation_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Result<Reservation, BookingError> {
        let screening_id = self.load(reservation_id).await?.screening_id;
        let map = self.locks.entry(screening_id).await;
        let mut map = map.lock().await;

        // Reload under the lock: a concurrent cancel or sweep may have won
        let mut reservation = self.load(reservation_id).await?;
        if reservation.status != ReservationStatus::Pending {
            return Err(BookingError::AlreadyProcessed(reservation_id));
        }

        let now = self.clock.now();
        if HoldExpiryManager::is_expired(&reservation, now) {
            let before = map.snapshot(&reservation.seats);
            let freed = map.release(&reservation.seats, reservation.id);
            reservation.update_status(ReservationStatus::Expired, now);
            match self.store.save(&reservation).await {
                Ok(()) => {
                    self.expiry.lock().await.forget(&reservation.id);
                    drop(map);
                    if !freed.is_empty() {
                        self.publish(BookingEvent::SeatsReleased {
                            screening_id,
                            reservation_id,
                            seats: freed,
                        })
                        .await;
                    }
                }
                Err(e) => {
                    // Transition not committed; the sweep retries it later
                    map.restore(before);
                    error!(reservation_id = %reservation.id, error = %e, "Failed to persist expiry");
                }
            }
            return Err(BookingError::HoldExpired(reservation_id));
        }

        let before = map.snapshot(&reservation.seats);
        map.mark_booked(&reservation.seats, reservation.id)?;
        reservation.update_status(ReservationStatus::Confirmed, now);
        reservation.payment_method = Some(payment_method);
        if let Err(e) = self.store.save(&reservation).await {
            map.restore(before);
            return Err(BookingError::Persistence(e.to_string()));
        }
        self.expiry.lock().await.forget(&reservation.id);
        drop(map);

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            "Reservation confirmed"
        );
        self.publish(BookingEvent::ReservationConfirmed {
            screening_id,
            reservation_id,
            seats: reservation.seats.clone(),
        })
        .await;

        Ok(reservation)
    }

    /// Cancel a pending hold or a confirmed booking, freeing its seats
    /// immediately. Cancelling an already-terminal reservation reports
    /// `AlreadyProcessed` and changes nothing.
    pub async fn cancel(&self, reservation_id: Uuid) -> Result<Reservation, BookingError> {
        let screening_id = self.load(reservation_id).await?.screening_id;
        let map = self.locks.entry(screening_id).await;
        let mut map = map.lock().await;

        let mut reservation = self.load(reservation_id).await?;
        match reservation.status {
            ReservationStatus::Pending | ReservationStatus::Confirmed => {}
            ReservationStatus::Cancelled | ReservationStatus::Expired => {
                return Err(BookingError::AlreadyProcessed(reservation_id));
            }
        }

        let now = self.clock.now();
        let before = map.snapshot(&reservation.seats);
        let previous_status = reservation.status;
        map.release(&reservation.seats, reservation.id);
        reservation.update_status(ReservationStatus::Cancelled, now);
        if let Err(e) = self.store.save(&reservation).await {
            map.restore(before);
            return Err(BookingError::Persistence(e.to_string()));
        }
        self.expiry.lock().await.forget(&reservation.id);
        drop(map);

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            from = ?previous_status,
            "Reservation cancelled"
        );
        self.publish(BookingEvent::ReservationCancelled {
            screening_id,
            reservation_id,
            seats: reservation.seats.clone(),
        })
        .await;

        Ok(reservation)
    }

    /// Release every pending hold whose deadline has passed. Returns the
    /// number of reservations expired. Individual failures are logged and
    /// skipped so one stuck reservation cannot halt the sweep.
    pub async fn expire_due(&self) -> usize {
        let now = self.clock.now();
        let due = self.expiry.lock().await.sweep_due(now);

        let mut expired = 0;
        for (reservation_id, screening_id) in due {
            match self.expire_one(reservation_id, screening_id).await {
                Ok(true) => expired += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(reservation_id = %reservation_id, error = %e, "Failed to expire hold");
                }
            }
        }
        expired
    }

    async fn expire_one(
        &self,
        reservation_id: Uuid,
        screening_id: Uuid,
    ) -> Result<bool, BookingError> {
        let map = self.locks.entry(screening_id).await;
        let mut map = map.lock().await;

        let Some(mut reservation) = self.store.load(reservation_id).await? else {
            self.expiry.lock().await.forget(&reservation_id);
            return Ok(false);
        };

        // A concurrent confirm or cancel may have beaten the sweep to the lock
        let now = self.clock.now();
        if reservation.status != ReservationStatus::Pending
            || !HoldExpiryManager::is_expired(&reservation, now)
        {
            self.expiry.lock().await.forget(&reservation_id);
            return Ok(false);
        }

        let before = map.snapshot(&reservation.seats);
        let freed = map.release(&reservation.seats, reservation.id);
        reservation.update_status(ReservationStatus::Expired, now);
        if let Err(e) = self.store.save(&reservation).await {
            // Keep the deadline registered; the next sweep retries
            map.restore(before);
            return Err(BookingError::Persistence(e.to_string()));
        }
        self.expiry.lock().await.forget(&reservation_id);
        drop(map);

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            "Hold expired, seats released"
        );
        if !freed.is_empty() {
            self.publish(BookingEvent::SeatsReleased {
                screening_id,
                reservation_id,
                seats: freed,
            })
            .await;
        }
        Ok(true)
    }

    /// Rebuild the seat maps and expiry index from stored reservations.
    /// Called once at startup when the store adapter is durable.
    pub async fn rehydrate(&self) -> Result<usize, BookingError> {
        let active = self.store.find_active().await?;
        let count = active.len();

        for reservation in active {
            let map = self.locks.entry(reservation.screening_id).await;
            let mut map = map.lock().await;
            match reservation.status {
                ReservationStatus::Pending => {
                    let entries = reservation
                        .seats
                        .iter()
                        .map(|seat| {
                            (
                                seat.clone(),
                                crate::seat_map::SeatState::Held {
                                    reservation_id: reservation.id,
                                    expires_at: reservation.expires_at,
                                },
                            )
                        })
                        .collect();
                    map.restore(entries);
                    self.expiry.lock().await.register(
                        reservation.id,
                        reservation.screening_id,
                        reservation.expires_at,
                    );
                }
                ReservationStatus::Confirmed => {
                    let entries = reservation
                        .seats
                        .iter()
                        .map(|seat| {
                            (
                                seat.clone(),
                                crate::seat_map::SeatState::Booked {
                                    reservation_id: reservation.id,
                                },
                            )
                        })
                        .collect();
                    map.restore(entries);
                }
                _ => {}
            }
        }

        Ok(count)
    }

    // ------------------------------------------------------------------
    // Queries — tolerant of eventual consistency with in-flight mutations
    // ------------------------------------------------------------------

    pub async fn get(&self, reservation_id: Uuid) -> Result<Reservation, BookingError> {
        self.load(reservation_id).await
    }

    pub async fn by_code(&self, code: &str) -> Result<Reservation, BookingError> {
        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {code}")))
    }

    /// Seconds until the hold lapses; zero once expired or terminal.
    pub async fn remaining_seconds(&self, reservation_id: Uuid) -> Result<i64, BookingError> {
        let reservation = self.load(reservation_id).await?;
        if reservation.status != ReservationStatus::Pending {
            return Ok(0);
        }
        Ok(reservation.remaining_seconds(self.clock.now()))
    }

    pub async fn by_requester(&self, email: &str) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.find_by_requester(email).await?)
    }

    pub async fn by_screening(&self, screening_id: Uuid) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.store.find_by_screening(screening_id).await?)
    }

    /// Availability of every seat of a screening's layout, with lazy expiry
    /// applied to the view.
    pub async fn seat_states(&self, screening_id: Uuid) -> Result<Vec<SeatStatus>, BookingError> {
        let screening = self.screening(screening_id).await?;
        let auditorium = self
            .directory
            .get_auditorium(screening.auditorium_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("auditorium {}", screening.auditorium_id)))?;

        let map = self.locks.entry(screening_id).await;
        let map = map.lock().await;
        let now = self.clock.now();

        Ok(auditorium
            .seats()
            .into_iter()
            .map(|seat| {
                let availability = map.availability(&seat, now);
                SeatStatus { seat, availability }
            })
            .collect())
    }

    // ------------------------------------------------------------------

    async fn screening(&self, id: Uuid) -> Result<cinebook_catalog::Screening, BookingError> {
        let screening = self
            .directory
            .get_screening(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("screening {id}")))?;
        if !screening.active {
            return Err(BookingError::NotFound(format!("screening {id}")));
        }
        Ok(screening)
    }

    async fn load(&self, id: Uuid) -> Result<Reservation, BookingError> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {id}")))
    }

    async fn publish(&self, event: BookingEvent) {
        if let Err(e) = self.notifier.publish(event).await {
            warn!(error = %e, "Failed to publish booking event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tokio::sync::RwLock;

    use cinebook_catalog::{Auditorium, AuditoriumKind, Screening};
    use cinebook_core::clock::ManualClock;
    use cinebook_core::events::NoopNotifier;

    use crate::error::StoreError;

    /// Minimal store for exercising the engine in isolation.
    #[derive(Default)]
    struct TestStore {
        reservations: RwLock<HashMap<Uuid, Reservation>>,
    }

    #[async_trait]
    impl ReservationStore for TestStore {
        async fn save(&self, reservation: &Reservation) -> Result<(), StoreError> {
            self.reservations
                .write()
                .await
                .insert(reservation.id, reservation.clone());
            Ok(())
        }

        async fn load(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
            Ok(self.reservations.read().await.get(&id).cloned())
        }

        async fn find_by_code(&self, code: &str) -> Result<Option<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .find(|r| r.code == code)
                .cloned())
        }

        async fn find_by_requester(&self, email: &str) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| r.requester.email == email)
                .cloned()
                .collect())
        }

        async fn find_by_screening(
            &self,
            screening_id: Uuid,
        ) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| r.screening_id == screening_id)
                .cloned()
                .collect())
        }

        async fn find_pending_by_screening(
            &self,
            screening_id: Uuid,
        ) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| {
                    r.screening_id == screening_id && r.status == ReservationStatus::Pending
                })
                .cloned()
                .collect())
        }

        async fn find_due_before(
            &self,
            deadline: DateTime<Utc>,
        ) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| r.status == ReservationStatus::Pending && r.expires_at <= deadline)
                .cloned()
                .collect())
        }

        async fn find_active(&self) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .read()
                .await
                .values()
                .filter(|r| {
                    matches!(
                        r.status,
                        ReservationStatus::Pending | ReservationStatus::Confirmed
                    )
                })
                .cloned()
                .collect())
        }
    }

    struct TestDirectory {
        screening: Screening,
        auditorium: Auditorium,
    }

    #[async_trait]
    impl ScreeningDirectory for TestDirectory {
        async fn get_screening(&self, id: Uuid) -> Result<Option<Screening>, StoreError> {
            Ok((self.screening.id == id).then(|| self.screening.clone()))
        }

        async fn get_auditorium(&self, id: Uuid) -> Result<Option<Auditorium>, StoreError> {
            Ok((self.auditorium.id == id).then(|| self.auditorium.clone()))
        }
    }

    struct Fixture {
        engine: ReservationEngine,
        clock: ManualClock,
        screening_id: Uuid,
    }

    fn fixture() -> Fixture {
        let auditorium = Auditorium::new("Sala 1", AuditoriumKind::TwoD, 5, 10);
        let screening = Screening::new(
            Uuid::new_v4(),
            auditorium.id,
            Utc::now() + Duration::hours(4),
            120,
            1500,
            "USD",
        );
        let screening_id = screening.id;
        let clock = ManualClock::new(Utc::now());

        let engine = ReservationEngine::new(
            Arc::new(TestDirectory {
                screening,
                auditorium,
            }),
            Arc::new(TestStore::default()),
            Arc::new(NoopNotifier),
            Arc::new(clock.clone()),
            BookingPolicy::from_seconds(600),
        );

        Fixture {
            engine,
            clock,
            screening_id,
        }
    }

    fn seats(ids: &[&str]) -> Vec<SeatId> {
        ids.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn requester() -> Requester {
        Requester::anonymous("Ana", "ana@example.com")
    }

    #[tokio::test]
    async fn test_hold_confirm_happy_path() {
        let f = fixture();
        let held = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["A1", "A2"]))
            .await
            .unwrap();

        assert_eq!(held.status, ReservationStatus::Pending);
        assert_eq!(held.total_cents, 3000);

        let confirmed = f.engine.confirm(held.id, PaymentMethod::Card).await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert_eq!(confirmed.payment_method, Some(PaymentMethod::Card));
    }

    #[tokio::test]
    async fn test_overlapping_hold_is_fully_rejected() {
        let f = fixture();
        f.engine
            .create_hold(f.screening_id, requester(), seats(&["C1", "C2"]))
            .await
            .unwrap();

        let err = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["C2", "C3"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatConflict(ref s) if s.to_string() == "C2"));

        // C3 stayed free: holding it alone succeeds
        f.engine
            .create_hold(f.screening_id, requester(), seats(&["C3"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_confirm_after_expiry_fails_and_frees_seats() {
        let f = fixture();
        let held = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["B1", "B2"]))
            .await
            .unwrap();

        f.clock.advance(Duration::seconds(601));

        let err = f.engine.confirm(held.id, PaymentMethod::Cash).await.unwrap_err();
        assert!(matches!(err, BookingError::HoldExpired(id) if id == held.id));
        assert_eq!(
            f.engine.get(held.id).await.unwrap().status,
            ReservationStatus::Expired
        );

        // Seats are immediately holdable by a new request
        f.engine
            .create_hold(f.screening_id, requester(), seats(&["B1", "B2"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_releases_due_holds() {
        let f = fixture();
        let held = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["D1"]))
            .await
            .unwrap();

        assert_eq!(f.engine.expire_due().await, 0, "nothing due yet");

        f.clock.advance(Duration::seconds(601));
        assert_eq!(f.engine.expire_due().await, 1);
        assert_eq!(
            f.engine.get(held.id).await.unwrap().status,
            ReservationStatus::Expired
        );

        f.engine
            .create_hold(f.screening_id, requester(), seats(&["D1"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_twice_reports_already_processed() {
        let f = fixture();
        let held = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["E5"]))
            .await
            .unwrap();

        f.engine.cancel(held.id).await.unwrap();
        // Seat freed in the same logical step, before any TTL elapses
        f.engine
            .create_hold(f.screening_id, requester(), seats(&["E5"]))
            .await
            .unwrap();

        let err = f.engine.cancel(held.id).await.unwrap_err();
        assert!(matches!(err, BookingError::AlreadyProcessed(id) if id == held.id));
    }

    #[tokio::test]
    async fn test_unknown_seat_rejected_before_any_hold() {
        let f = fixture();
        let err = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["Z99"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::UnknownSeat(_)));
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let f = fixture();
        let err = f
            .engine
            .create_hold(f.screening_id, requester(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::EmptySeatSelection));
    }

    #[tokio::test]
    async fn test_duplicate_seats_are_normalized() {
        let f = fixture();
        let held = f
            .engine
            .create_hold(f.screening_id, requester(), seats(&["A3", "A3", "A2"]))
            .await
            .unwrap();

        assert_eq!(held.seats, seats(&["A2", "A3"]));
        assert_eq!(held.total_cents, 3000, "charged per distinct seat");
    }
}
