use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use cinebook_core::events::{BookingEvent, NotificationPort, NotifyError};

/// Fan-out of booking events to in-process subscribers over a tokio
/// broadcast channel; the API layer bridges subscribers onto SSE streams.
///
/// Publishing never fails the caller: with no subscribers the event is
/// simply dropped, and a slow subscriber that lags the channel misses
/// events rather than blocking the engine.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<BookingEvent>,
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl NotificationPort for EventBroadcaster {
    async fn publish(&self, event: BookingEvent) -> Result<(), NotifyError> {
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!(receivers, "Booking event broadcast");
            }
            Err(_) => {
                debug!("Booking event dropped, no subscribers");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let broadcaster = EventBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        let screening_id = Uuid::new_v4();
        broadcaster
            .publish(BookingEvent::SeatsReleased {
                screening_id,
                reservation_id: Uuid::new_v4(),
                seats: vec!["A1".parse().unwrap()],
            })
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.screening_id(), screening_id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let broadcaster = EventBroadcaster::new(16);
        broadcaster
            .publish(BookingEvent::SeatsReleased {
                screening_id: Uuid::new_v4(),
                reservation_id: Uuid::new_v4(),
                seats: vec![],
            })
            .await
            .unwrap();
    }
}
