use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use cinebook_booking::error::StoreError;
use cinebook_booking::model::{Reservation, ReservationStatus};
use cinebook_booking::ports::ReservationStore;

/// In-memory reservation store for single-node deployments.
///
/// Reads reflect the most recent write on this process, which is all the
/// engine requires of a storage adapter.
#[derive(Debug, Default)]
pub struct MemoryReservationStore {
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn save(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.reservations
            .write()
            .await
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Reservation>, StoreError> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn find_by_requester(&self, email: &str) -> Result<Vec<Reservation>, StoreError> {
        let mut found: Vec<Reservation> = self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.requester.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn find_by_screening(&self, screening_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let mut found: Vec<Reservation> = self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.screening_id == screening_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn find_pending_by_screening(
        &self,
        screening_id: Uuid,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.screening_id == screening_id && r.status == ReservationStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_due_before(
        &self,
        deadline: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.status == ReservationStatus::Pending && r.expires_at <= deadline)
            .cloned()
            .collect())
    }

    async fn find_active(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| {
                matches!(
                    r.status,
                    ReservationStatus::Pending | ReservationStatus::Confirmed
                )
            })
            .cloned()
            .collect())
    }
}
