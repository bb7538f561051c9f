use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::seat_map::SeatMap;

/// One mutual-exclusion unit per screening, created lazily on first access
/// and retained for the screening's lifetime.
///
/// The lock *is* the seat map's guard: all seat-state mutation and every
/// multi-step check-then-mutate sequence runs while holding the screening's
/// `Mutex<SeatMap>`. Locks for different screenings are independent, so
/// unrelated screenings never contend.
#[derive(Debug, Default)]
pub struct ScreeningLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<SeatMap>>>>,
}

impl ScreeningLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock/seat-map pair for a screening. The registry lock is released
    /// before the returned handle is locked, so callers for different
    /// screenings proceed in parallel.
    pub async fn entry(&self, screening_id: Uuid) -> Arc<Mutex<SeatMap>> {
        let mut registry = self.inner.lock().await;
        registry
            .entry(screening_id)
            .or_insert_with(|| Arc::new(Mutex::new(SeatMap::new())))
            .clone()
    }
}
