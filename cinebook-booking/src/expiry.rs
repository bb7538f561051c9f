use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::Reservation;

#[derive(Debug, Clone, Copy)]
struct HoldDeadline {
    screening_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Deadline index over all pending holds, across every screening.
///
/// A hold's timeout is data, not a scheduled callback: the engine registers
/// `expires_at` here and the periodic sweep asks which holds are due.
/// Detection is separated from action — `sweep_due` mutates nothing and holds
/// no screening lock, so the sweep can never deadlock against in-flight
/// operations; the engine re-checks each candidate under its screening lock
/// before acting.
#[derive(Debug, Default)]
pub struct HoldExpiryManager {
    deadlines: HashMap<Uuid, HoldDeadline>,
}

impl HoldExpiryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, reservation_id: Uuid, screening_id: Uuid, expires_at: DateTime<Utc>) {
        self.deadlines.insert(
            reservation_id,
            HoldDeadline {
                screening_id,
                expires_at,
            },
        );
    }

    pub fn forget(&mut self, reservation_id: &Uuid) {
        self.deadlines.remove(reservation_id);
    }

    pub fn is_expired(reservation: &Reservation, now: DateTime<Utc>) -> bool {
        now >= reservation.expires_at
    }

    /// All registered holds whose deadline has passed, as
    /// `(reservation_id, screening_id)` pairs. Read-only.
    pub fn sweep_due(&self, now: DateTime<Utc>) -> Vec<(Uuid, Uuid)> {
        self.deadlines
            .iter()
            .filter(|(_, deadline)| now >= deadline.expires_at)
            .map(|(id, deadline)| (*id, deadline.screening_id))
            .collect()
    }

    pub fn tracked(&self) -> usize {
        self.deadlines.len()
    }
}
