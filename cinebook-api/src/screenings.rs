use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use cinebook_catalog::{Auditorium, AuditoriumKind, Screening};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAuditoriumRequest {
    pub name: String,
    pub kind: AuditoriumKind,
    pub rows: u32,
    pub seats_per_row: u32,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleScreeningRequest {
    pub movie_id: Uuid,
    pub auditorium_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub base_price_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub row_price_overrides: HashMap<String, i64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListScreeningsQuery {
    #[serde(default)]
    pub upcoming: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auditoriums", post(create_auditorium).get(list_auditoriums))
        .route("/v1/screenings", post(schedule_screening).get(list_screenings))
        .route("/v1/screenings/{id}", delete(deactivate_screening))
}

async fn create_auditorium(
    State(state): State<AppState>,
    Json(req): Json<CreateAuditoriumRequest>,
) -> Result<(StatusCode, Json<Auditorium>), AppError> {
    let auditorium = state
        .board
        .add_auditorium(Auditorium::new(req.name, req.kind, req.rows, req.seats_per_row))
        .await?;
    Ok((StatusCode::CREATED, Json(auditorium)))
}

async fn list_auditoriums(State(state): State<AppState>) -> Json<Vec<Auditorium>> {
    Json(state.board.list_auditoriums().await)
}

async fn schedule_screening(
    State(state): State<AppState>,
    Json(req): Json<ScheduleScreeningRequest>,
) -> Result<(StatusCode, Json<Screening>), AppError> {
    let mut screening = Screening::new(
        req.movie_id,
        req.auditorium_id,
        req.starts_at,
        req.duration_minutes,
        req.base_price_cents,
        req.currency,
    );
    screening.row_price_overrides = req.row_price_overrides;

    let screening = state.board.schedule(screening).await?;
    Ok((StatusCode::CREATED, Json(screening)))
}

async fn list_screenings(
    State(state): State<AppState>,
    Query(query): Query<ListScreeningsQuery>,
) -> Json<Vec<Screening>> {
    let screenings = if query.upcoming {
        state.board.list_upcoming(Utc::now()).await
    } else {
        state.board.list_active().await
    };
    Json(screenings)
}

async fn deactivate_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.board.deactivate_screening(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
