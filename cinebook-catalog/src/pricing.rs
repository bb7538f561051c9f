use serde::{Deserialize, Serialize};

use cinebook_core::seat::SeatId;

use crate::screening::Screening;

/// Priced seat selection for one screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub total_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub seat: SeatId,
    pub price_cents: i64,
}

/// Sum of per-seat prices. Callers pass the already-deduplicated seat set;
/// duplicates here would double-charge.
pub fn quote(screening: &Screening, seats: &[SeatId]) -> Quote {
    let lines: Vec<QuoteLine> = seats
        .iter()
        .map(|seat| QuoteLine {
            seat: seat.clone(),
            price_cents: screening.seat_price_cents(seat),
        })
        .collect();
    let total_cents = lines.iter().map(|line| line.price_cents).sum();

    Quote {
        lines,
        total_cents,
        currency: screening.currency.clone(),
    }
}
