use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seat::SeatId;

/// State-change announcements emitted by the reservation engine.
///
/// Every event names the screening and the affected seats so connected
/// seat-picker clients can refresh their view without a full reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEvent {
    SeatsHeld {
        screening_id: Uuid,
        reservation_id: Uuid,
        seats: Vec<SeatId>,
        expires_at: DateTime<Utc>,
    },
    SeatsReleased {
        screening_id: Uuid,
        reservation_id: Uuid,
        seats: Vec<SeatId>,
    },
    ReservationConfirmed {
        screening_id: Uuid,
        reservation_id: Uuid,
        seats: Vec<SeatId>,
    },
    ReservationCancelled {
        screening_id: Uuid,
        reservation_id: Uuid,
        seats: Vec<SeatId>,
    },
}

impl BookingEvent {
    pub fn screening_id(&self) -> Uuid {
        match self {
            BookingEvent::SeatsHeld { screening_id, .. }
            | BookingEvent::SeatsReleased { screening_id, .. }
            | BookingEvent::ReservationConfirmed { screening_id, .. }
            | BookingEvent::ReservationCancelled { screening_id, .. } => *screening_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound port for announcing booking state changes.
///
/// Delivery is fire-and-forget: a failed publish must never roll back the
/// state transition that produced the event.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, event: BookingEvent) -> Result<(), NotifyError>;
}

/// Discards every event. Used in tests and in deployments with no
/// push channel configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationPort for NoopNotifier {
    async fn publish(&self, _event: BookingEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}
