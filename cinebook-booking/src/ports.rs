use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cinebook_catalog::{Auditorium, Screening};

use crate::error::StoreError;
use crate::model::Reservation;

/// Storage port for reservations.
///
/// The engine is storage-agnostic: any adapter works provided reads reflect
/// the most recent write on the same process. The engine treats a `save`
/// failure as "transition not committed" and rolls back its in-memory state,
/// so adapters must not partially apply a write.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn save(&self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn load(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Reservation>, StoreError>;

    async fn find_by_requester(&self, email: &str) -> Result<Vec<Reservation>, StoreError>;

    async fn find_by_screening(&self, screening_id: Uuid) -> Result<Vec<Reservation>, StoreError>;

    async fn find_pending_by_screening(
        &self,
        screening_id: Uuid,
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Pending reservations whose hold deadline is at or before `deadline`.
    async fn find_due_before(&self, deadline: DateTime<Utc>)
        -> Result<Vec<Reservation>, StoreError>;

    /// Pending and confirmed reservations, used to rebuild the seat maps and
    /// expiry index after a restart.
    async fn find_active(&self) -> Result<Vec<Reservation>, StoreError>;
}

/// Read-only catalog lookup consumed by the engine. Results are used within
/// one operation and never cached across operations.
#[async_trait]
pub trait ScreeningDirectory: Send + Sync {
    async fn get_screening(&self, id: Uuid) -> Result<Option<Screening>, StoreError>;

    async fn get_auditorium(&self, id: Uuid) -> Result<Option<Auditorium>, StoreError>;
}
