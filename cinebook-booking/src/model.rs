use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cinebook_core::payment::PaymentMethod;
use cinebook_core::seat::SeatId;

/// Reservation status in the lifecycle.
///
/// `Pending` is the only non-terminal status. A pending hold is promoted to
/// `Confirmed` by payment, or ends `Cancelled` (user) or `Expired` (timeout).
/// A confirmed reservation can still be cancelled explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Pending)
    }
}

/// Who is claiming the seats: a registered user or an anonymous buyer.
/// Either way the contact info travels with the reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

impl Requester {
    pub fn anonymous(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn registered(user_id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One claim over a set of seats for one screening.
///
/// The reservation is the source of truth for its seat set; the per-screening
/// seat map is only a derived index. Reservations are never hard-deleted by
/// the engine — terminal records stay for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    /// Human-facing lookup code printed on the ticket, e.g. `RES-7K2PQX9A`.
    pub code: String,
    pub screening_id: Uuid,
    /// Sorted and deduplicated.
    pub seats: Vec<SeatId>,
    pub requester: Requester,
    pub status: ReservationStatus,
    pub total_cents: i64,
    pub currency: String,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        screening_id: Uuid,
        requester: Requester,
        seats: Vec<SeatId>,
        total_cents: i64,
        currency: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: generate_code(),
            screening_id,
            seats,
            requester,
            status: ReservationStatus::Pending,
            total_cents,
            currency: currency.into(),
            payment_method: None,
            created_at,
            expires_at,
            updated_at: created_at,
        }
    }

    pub fn update_status(&mut self, status: ReservationStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }

    /// Seconds left before the hold lapses, clamped at zero. Only meaningful
    /// while the reservation is pending.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 8;

/// `RES-` plus 8 characters from an alphabet without 0/O/1/I, so the code
/// can be read back over the phone.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect();
    format!("RES-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reservation(now: DateTime<Utc>) -> Reservation {
        Reservation::new(
            Uuid::new_v4(),
            Requester::anonymous("Ana", "ana@example.com"),
            vec![SeatId::new("A", 1), SeatId::new("A", 2)],
            3000,
            "USD",
            now,
            now + Duration::minutes(10),
        )
    }

    #[test]
    fn test_new_reservation_is_pending_with_code() {
        let now = Utc::now();
        let r = reservation(now);

        assert_eq!(r.status, ReservationStatus::Pending);
        assert!(!r.status.is_terminal());
        assert!(r.code.starts_with("RES-"));
        assert_eq!(r.code.len(), 12);
    }

    #[test]
    fn test_remaining_seconds_clamps_at_zero() {
        let now = Utc::now();
        let r = reservation(now);

        assert_eq!(r.remaining_seconds(now), 600);
        assert_eq!(r.remaining_seconds(now + Duration::minutes(9)), 60);
        assert_eq!(r.remaining_seconds(now + Duration::minutes(11)), 0);
    }

    #[test]
    fn test_update_status_touches_updated_at() {
        let now = Utc::now();
        let mut r = reservation(now);
        let later = now + Duration::seconds(42);

        r.update_status(ReservationStatus::Confirmed, later);
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.updated_at, later);
    }
}
