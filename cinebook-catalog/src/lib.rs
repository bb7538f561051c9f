pub mod auditorium;
pub mod pricing;
pub mod screening;

pub use auditorium::{Auditorium, AuditoriumKind};
pub use pricing::Quote;
pub use screening::Screening;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Screening not found: {0}")]
    ScreeningNotFound(uuid::Uuid),

    #[error("Auditorium not found: {0}")]
    AuditoriumNotFound(uuid::Uuid),

    #[error("Auditorium {auditorium_id} already has a screening overlapping {starts_at}")]
    ScheduleConflict {
        auditorium_id: uuid::Uuid,
        starts_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("Auditorium layout must have at least one row and one seat per row")]
    InvalidLayout,
}
