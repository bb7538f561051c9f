pub mod engine;
pub mod error;
pub mod expiry;
pub mod model;
pub mod ports;
pub mod screening_lock;
pub mod seat_map;

pub use engine::{BookingPolicy, ReservationEngine, SeatStatus};
pub use error::{BookingError, StoreError};
pub use expiry::HoldExpiryManager;
pub use model::{Requester, Reservation, ReservationStatus};
pub use ports::{ReservationStore, ScreeningDirectory};
pub use seat_map::{SeatAvailability, SeatMap, SeatState};
