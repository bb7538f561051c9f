use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use cinebook_booking::error::StoreError;
use cinebook_booking::ports::ScreeningDirectory;
use cinebook_catalog::{Auditorium, CatalogError, Screening};

#[derive(Debug, Default)]
struct BoardState {
    auditoriums: HashMap<Uuid, Auditorium>,
    screenings: HashMap<Uuid, Screening>,
}

/// Auditorium and screening registry with the admin operations the booking
/// flow needs: schedule (with room-conflict detection), deactivate, list.
///
/// Doubles as the engine's read-only [`ScreeningDirectory`].
#[derive(Debug, Default)]
pub struct ScreeningBoard {
    state: RwLock<BoardState>,
}

impl ScreeningBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_auditorium(&self, auditorium: Auditorium) -> Result<Auditorium, CatalogError> {
        if auditorium.rows == 0 || auditorium.seats_per_row == 0 {
            return Err(CatalogError::InvalidLayout);
        }
        let mut state = self.state.write().await;
        info!(auditorium_id = %auditorium.id, name = %auditorium.name, "Auditorium registered");
        state.auditoriums.insert(auditorium.id, auditorium.clone());
        Ok(auditorium)
    }

    /// Register a screening, rejecting it if the auditorium is unknown or
    /// already hosts an overlapping screening (cleaning buffer included).
    pub async fn schedule(&self, screening: Screening) -> Result<Screening, CatalogError> {
        let mut state = self.state.write().await;

        if !state.auditoriums.contains_key(&screening.auditorium_id) {
            return Err(CatalogError::AuditoriumNotFound(screening.auditorium_id));
        }
        if state
            .screenings
            .values()
            .any(|existing| screening.conflicts_with(existing))
        {
            return Err(CatalogError::ScheduleConflict {
                auditorium_id: screening.auditorium_id,
                starts_at: screening.starts_at,
            });
        }

        info!(
            screening_id = %screening.id,
            auditorium_id = %screening.auditorium_id,
            starts_at = %screening.starts_at,
            "Screening scheduled"
        );
        state.screenings.insert(screening.id, screening.clone());
        Ok(screening)
    }

    /// Soft delete: the screening stops accepting holds and stops blocking
    /// its room, but stays readable for existing reservations.
    pub async fn deactivate_screening(&self, id: Uuid) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let screening = state
            .screenings
            .get_mut(&id)
            .ok_or(CatalogError::ScreeningNotFound(id))?;
        screening.active = false;
        info!(screening_id = %id, "Screening deactivated");
        Ok(())
    }

    pub async fn list_active(&self) -> Vec<Screening> {
        let state = self.state.read().await;
        let mut screenings: Vec<Screening> = state
            .screenings
            .values()
            .filter(|s| s.active)
            .cloned()
            .collect();
        screenings.sort_by_key(|s| s.starts_at);
        screenings
    }

    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> Vec<Screening> {
        self.list_active()
            .await
            .into_iter()
            .filter(|s| s.starts_at > now)
            .collect()
    }

    pub async fn list_auditoriums(&self) -> Vec<Auditorium> {
        let state = self.state.read().await;
        let mut auditoriums: Vec<Auditorium> = state.auditoriums.values().cloned().collect();
        auditoriums.sort_by(|a, b| a.name.cmp(&b.name));
        auditoriums
    }
}

#[async_trait]
impl ScreeningDirectory for ScreeningBoard {
    async fn get_screening(&self, id: Uuid) -> Result<Option<Screening>, StoreError> {
        Ok(self.state.read().await.screenings.get(&id).cloned())
    }

    async fn get_auditorium(&self, id: Uuid) -> Result<Option<Auditorium>, StoreError> {
        Ok(self.state.read().await.auditoriums.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use cinebook_catalog::AuditoriumKind;

    async fn board_with_room() -> (ScreeningBoard, Uuid) {
        let board = ScreeningBoard::new();
        let room = board
            .add_auditorium(Auditorium::new("Sala 1", AuditoriumKind::ThreeD, 8, 12))
            .await
            .unwrap();
        (board, room.id)
    }

    fn screening(room: Uuid, starts_at: DateTime<Utc>) -> Screening {
        Screening::new(Uuid::new_v4(), room, starts_at, 120, 1500, "USD")
    }

    #[tokio::test]
    async fn test_schedule_rejects_overlap_in_same_room() {
        let (board, room) = board_with_room().await;
        let start = Utc::now() + Duration::hours(2);

        board.schedule(screening(room, start)).await.unwrap();

        let overlapping = screening(room, start + Duration::minutes(60));
        let err = board.schedule(overlapping).await.unwrap_err();
        assert!(matches!(err, CatalogError::ScheduleConflict { .. }));

        // Far enough out (movie + cleaning buffer) is fine
        board
            .schedule(screening(room, start + Duration::minutes(151)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_schedule_requires_known_auditorium() {
        let board = ScreeningBoard::new();
        let err = board
            .schedule(screening(Uuid::new_v4(), Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AuditoriumNotFound(_)));
    }

    #[tokio::test]
    async fn test_deactivated_screening_leaves_room_and_listing() {
        let (board, room) = board_with_room().await;
        let start = Utc::now() + Duration::hours(2);
        let first = board.schedule(screening(room, start)).await.unwrap();

        board.deactivate_screening(first.id).await.unwrap();
        assert!(board.list_active().await.is_empty());

        // The slot is reusable once the original is deactivated
        board.schedule(screening(room, start)).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_layout_rejected() {
        let board = ScreeningBoard::new();
        let err = board
            .add_auditorium(Auditorium::new("Broken", AuditoriumKind::TwoD, 0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidLayout));
    }
}
