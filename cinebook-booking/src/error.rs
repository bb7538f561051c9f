use cinebook_core::seat::SeatId;
use uuid::Uuid;

/// Outcomes of reservation operations that callers must handle.
///
/// `SeatConflict` and `HoldExpired` are expected, frequent results of normal
/// seat contention, not internal failures; both carry enough detail for the
/// client to refresh its selection.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Seat not available: {0}")]
    SeatConflict(SeatId),

    #[error("Seat not in room layout: {0}")]
    UnknownSeat(SeatId),

    #[error("Reservation must include at least one seat")]
    EmptySeatSelection,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Hold expired for reservation {0}")]
    HoldExpired(Uuid),

    #[error("Reservation already processed: {0}")]
    AlreadyProcessed(Uuid),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// Failures of the storage adapter behind [`crate::ports::ReservationStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Persistence(err.to_string())
    }
}
