use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cinebook_booking::engine::SeatStatus;
use cinebook_booking::model::{Requester, Reservation, ReservationStatus};
use cinebook_core::payment::PaymentMethod;
use cinebook_core::seat::SeatId;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub screening_id: Uuid,
    pub seats: Vec<SeatId>,
    pub customer_name: String,
    pub customer_email: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub code: String,
    pub screening_id: Uuid,
    pub seats: Vec<SeatId>,
    pub status: ReservationStatus,
    pub total_cents: i64,
    pub currency: String,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            code: r.code,
            screening_id: r.screening_id,
            seats: r.seats,
            status: r.status,
            total_cents: r.total_cents,
            currency: r.currency,
            payment_method: r.payment_method,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemainingResponse {
    pub seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct RequesterQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SeatViewResponse {
    pub screening_id: Uuid,
    pub seats: Vec<SeatStatus>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations",
            post(create_reservation).get(list_by_requester),
        )
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/confirm", post(confirm_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/reservations/{id}/remaining", get(remaining_seconds))
        .route("/v1/reservations/code/{code}", get(get_by_code))
        .route("/v1/screenings/{id}/seats", get(screening_seats))
        .route("/v1/screenings/{id}/reservations", get(list_by_screening))
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let requester = match req.user_id {
        Some(user_id) => Requester::registered(user_id, req.customer_name, req.customer_email),
        None => Requester::anonymous(req.customer_name, req.customer_email),
    };

    let reservation = state
        .engine
        .create_hold(req.screening_id, requester, req.seats)
        .await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    // Charge first; the engine then re-validates the hold under its lock and
    // reports the terminal status if payment raced an expiry or cancel.
    let pending = state.engine.get(id).await?;
    state
        .payments
        .charge(
            id,
            pending.total_cents,
            &pending.currency,
            req.payment_method,
        )
        .await?;

    let confirmed = state.engine.confirm(id, req.payment_method).await?;
    Ok(Json(confirmed.into()))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let cancelled = state.engine.cancel(id).await?;
    Ok(Json(cancelled.into()))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.engine.get(id).await?;
    Ok(Json(reservation.into()))
}

async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.engine.by_code(&code).await?;
    Ok(Json(reservation.into()))
}

async fn remaining_seconds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemainingResponse>, AppError> {
    let seconds = state.engine.remaining_seconds(id).await?;
    Ok(Json(RemainingResponse { seconds }))
}

async fn list_by_requester(
    State(state): State<AppState>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let reservations = state.engine.by_requester(&query.email).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

async fn list_by_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let reservations = state.engine.by_screening(id).await?;
    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

async fn screening_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatViewResponse>, AppError> {
    let seats = state.engine.seat_states(id).await?;
    Ok(Json(SeatViewResponse {
        screening_id: id,
        seats,
    }))
}
