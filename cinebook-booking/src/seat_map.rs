use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use cinebook_core::seat::SeatId;

use crate::error::BookingError;

/// State of one seat for one screening. A seat with no entry in the map is
/// `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Free,
    Held {
        reservation_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    Booked {
        reservation_id: Uuid,
    },
}

/// Collapsed seat status for availability views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatAvailability {
    Free,
    Held,
    Booked,
}

/// Per-screening seat-state index, always mutated under the owning screening
/// lock.
///
/// Reads are side-effect free: an expired hold reads as available but stays
/// in the map until the engine releases it explicitly (lazy expiry). Every
/// multi-seat mutation checks all seats before touching any of them, so a
/// request either fully applies or leaves the map untouched.
#[derive(Debug, Default)]
pub struct SeatMap {
    states: HashMap<SeatId, SeatState>,
}

impl SeatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, seat: &SeatId) -> SeatState {
        self.states.get(seat).copied().unwrap_or(SeatState::Free)
    }

    /// True iff the seat is free, or held with a deadline that has already
    /// passed. Pure read: never clears the stale entry.
    pub fn is_available(&self, seat: &SeatId, now: DateTime<Utc>) -> bool {
        match self.state_of(seat) {
            SeatState::Free => true,
            SeatState::Held { expires_at, .. } => now >= expires_at,
            SeatState::Booked { .. } => false,
        }
    }

    pub fn availability(&self, seat: &SeatId, now: DateTime<Utc>) -> SeatAvailability {
        match self.state_of(seat) {
            SeatState::Free => SeatAvailability::Free,
            SeatState::Held { expires_at, .. } if now >= expires_at => SeatAvailability::Free,
            SeatState::Held { .. } => SeatAvailability::Held,
            SeatState::Booked { .. } => SeatAvailability::Booked,
        }
    }

    /// Transition all seats to held by `reservation_id`, or fail on the first
    /// unavailable seat without changing anything.
    pub fn mark_held(
        &mut self,
        seats: &[SeatId],
        reservation_id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        for seat in seats {
            if !self.is_available(seat, now) {
                return Err(BookingError::SeatConflict(seat.clone()));
            }
        }
        for seat in seats {
            self.states.insert(
                seat.clone(),
                SeatState::Held {
                    reservation_id,
                    expires_at,
                },
            );
        }
        Ok(())
    }

    /// Promote seats held by `reservation_id` to booked. Fails without side
    /// effects if any seat is not currently held by that same reservation.
    pub fn mark_booked(&mut self, seats: &[SeatId], reservation_id: Uuid) -> Result<(), BookingError> {
        for seat in seats {
            match self.state_of(seat) {
                SeatState::Held {
                    reservation_id: holder,
                    ..
                } if holder == reservation_id => {}
                state => {
                    return Err(BookingError::InvalidTransition {
                        from: state_name(&state).to_string(),
                        to: "BOOKED".to_string(),
                    });
                }
            }
        }
        for seat in seats {
            self.states
                .insert(seat.clone(), SeatState::Booked { reservation_id });
        }
        Ok(())
    }

    /// Free every listed seat still attributed to `reservation_id`, returning
    /// the seats actually freed. Idempotent; seats re-held by a newer
    /// reservation in the meantime are left alone.
    pub fn release(&mut self, seats: &[SeatId], reservation_id: Uuid) -> Vec<SeatId> {
        let mut freed = Vec::new();
        for seat in seats {
            let owned = match self.states.get(seat) {
                Some(SeatState::Held {
                    reservation_id: holder,
                    ..
                })
                | Some(SeatState::Booked {
                    reservation_id: holder,
                }) => *holder == reservation_id,
                _ => false,
            };
            if owned {
                self.states.remove(seat);
                freed.push(seat.clone());
            }
        }
        freed
    }

    /// Snapshot of the listed seats' raw states, for rollback when a
    /// persistence write fails mid-operation.
    pub(crate) fn snapshot(&self, seats: &[SeatId]) -> Vec<(SeatId, SeatState)> {
        seats
            .iter()
            .map(|seat| (seat.clone(), self.state_of(seat)))
            .collect()
    }

    /// Reinstate a snapshot taken by [`SeatMap::snapshot`].
    pub(crate) fn restore(&mut self, entries: Vec<(SeatId, SeatState)>) {
        for (seat, state) in entries {
            match state {
                SeatState::Free => {
                    self.states.remove(&seat);
                }
                other => {
                    self.states.insert(seat, other);
                }
            }
        }
    }
}

fn state_name(state: &SeatState) -> &'static str {
    match state {
        SeatState::Free => "FREE",
        SeatState::Held { .. } => "HELD",
        SeatState::Booked { .. } => "BOOKED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seats(ids: &[&str]) -> Vec<SeatId> {
        ids.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_hold_is_all_or_nothing() {
        let mut map = SeatMap::new();
        let now = Utc::now();
        let ttl = now + Duration::minutes(10);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        map.mark_held(&seats(&["C1", "C2"]), first, ttl, now).unwrap();

        let err = map
            .mark_held(&seats(&["C2", "C3"]), second, ttl, now)
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatConflict(ref seat) if seat.to_string() == "C2"));

        // C3 must not have been touched by the rejected request
        assert!(map.is_available(&"C3".parse().unwrap(), now));
        assert_eq!(map.state_of(&"C3".parse().unwrap()), SeatState::Free);
    }

    #[test]
    fn test_expired_hold_reads_as_available_without_mutation() {
        let mut map = SeatMap::new();
        let now = Utc::now();
        let holder = Uuid::new_v4();
        map.mark_held(&seats(&["A1"]), holder, now + Duration::seconds(1), now)
            .unwrap();

        let seat: SeatId = "A1".parse().unwrap();
        assert!(!map.is_available(&seat, now));

        let later = now + Duration::seconds(2);
        assert!(map.is_available(&seat, later));
        // Lazy expiry: the stale entry is still there until released
        assert!(matches!(map.state_of(&seat), SeatState::Held { .. }));
        assert_eq!(map.availability(&seat, later), SeatAvailability::Free);
    }

    #[test]
    fn test_booking_requires_matching_holder() {
        let mut map = SeatMap::new();
        let now = Utc::now();
        let holder = Uuid::new_v4();
        map.mark_held(&seats(&["B1"]), holder, now + Duration::minutes(10), now)
            .unwrap();

        let stranger = Uuid::new_v4();
        let err = map.mark_booked(&seats(&["B1"]), stranger).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition { .. }));

        map.mark_booked(&seats(&["B1"]), holder).unwrap();
        assert!(matches!(
            map.state_of(&"B1".parse().unwrap()),
            SeatState::Booked { .. }
        ));
    }

    #[test]
    fn test_release_only_frees_seats_owned_by_the_reservation() {
        let mut map = SeatMap::new();
        let now = Utc::now();
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();

        // Old hold lapses, new reservation re-holds the seat before any sweep
        map.mark_held(&seats(&["D4"]), old, now + Duration::seconds(1), now)
            .unwrap();
        let later = now + Duration::seconds(5);
        map.mark_held(&seats(&["D4"]), new, later + Duration::minutes(10), later)
            .unwrap();

        // The old reservation's release must not clobber the new hold
        let freed = map.release(&seats(&["D4"]), old);
        assert!(freed.is_empty());
        assert!(matches!(
            map.state_of(&"D4".parse().unwrap()),
            SeatState::Held { reservation_id, .. } if reservation_id == new
        ));

        let freed = map.release(&seats(&["D4"]), new);
        assert_eq!(freed, seats(&["D4"]));
        // Releasing again is a no-op
        assert!(map.release(&seats(&["D4"]), new).is_empty());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut map = SeatMap::new();
        let now = Utc::now();
        let holder = Uuid::new_v4();
        let set = seats(&["E1", "E2"]);
        map.mark_held(&set, holder, now + Duration::minutes(10), now)
            .unwrap();

        let before = map.snapshot(&set);
        map.mark_booked(&set, holder).unwrap();
        map.restore(before);

        assert!(matches!(
            map.state_of(&"E1".parse().unwrap()),
            SeatState::Held { .. }
        ));
    }
}
