pub mod clock;
pub mod events;
pub mod payment;
pub mod seat;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{BookingEvent, NoopNotifier, NotificationPort};
pub use payment::{MockPaymentAdapter, PaymentAdapter, PaymentMethod, PaymentReceipt};
pub use seat::SeatId;
