use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cinebook_core::seat::SeatId;

/// Time the auditorium stays blocked after the credits roll, for cleaning.
pub const CLEANING_BUFFER_MINUTES: i64 = 30;

/// One scheduled showing of a movie in an auditorium.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub auditorium_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub base_price_cents: i64,
    pub currency: String,
    /// Per-row price overrides (e.g. premium middle rows), in cents.
    #[serde(default)]
    pub row_price_overrides: HashMap<String, i64>,
    pub active: bool,
}

impl Screening {
    pub fn new(
        movie_id: Uuid,
        auditorium_id: Uuid,
        starts_at: DateTime<Utc>,
        duration_minutes: i64,
        base_price_cents: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            movie_id,
            auditorium_id,
            starts_at,
            duration_minutes,
            base_price_cents,
            currency: currency.into(),
            row_price_overrides: HashMap::new(),
            active: true,
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::minutes(self.duration_minutes)
    }

    /// End of showing plus the cleaning buffer; the auditorium cannot host
    /// another screening before this instant.
    pub fn blocks_until(&self) -> DateTime<Utc> {
        self.ends_at() + Duration::minutes(CLEANING_BUFFER_MINUTES)
    }

    /// Whether two screenings compete for the same auditorium at the same
    /// time, cleaning buffer included. A screening never conflicts with
    /// itself, and inactive screenings do not block the room.
    pub fn conflicts_with(&self, other: &Screening) -> bool {
        if self.id == other.id
            || self.auditorium_id != other.auditorium_id
            || !self.active
            || !other.active
        {
            return false;
        }
        self.starts_at < other.blocks_until() && other.starts_at < self.blocks_until()
    }

    /// Price of one seat: row override when present, base price otherwise.
    pub fn seat_price_cents(&self, seat: &SeatId) -> i64 {
        self.row_price_overrides
            .get(&seat.row)
            .copied()
            .unwrap_or(self.base_price_cents)
    }
}
