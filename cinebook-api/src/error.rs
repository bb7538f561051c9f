use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use cinebook_booking::BookingError;
use cinebook_catalog::CatalogError;
use cinebook_core::payment::PaymentError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Catalog(CatalogError),
    Payment(PaymentError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        Self::Payment(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Seat contention is a normal outcome: the body names the seat so
        // the client can refresh its selection instead of blind-retrying.
        let (status, body) = match self {
            AppError::Booking(BookingError::SeatConflict(seat)) => (
                StatusCode::CONFLICT,
                json!({ "error": format!("Seat not available: {seat}"), "seat": seat }),
            ),
            AppError::Booking(BookingError::UnknownSeat(seat)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Seat not in room layout: {seat}"), "seat": seat }),
            ),
            AppError::Booking(BookingError::EmptySeatSelection) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Reservation must include at least one seat" }),
            ),
            AppError::Booking(err @ BookingError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
            }
            AppError::Booking(err @ BookingError::InvalidTransition { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string() }),
            ),
            AppError::Booking(err @ BookingError::HoldExpired(_)) => {
                (StatusCode::GONE, json!({ "error": err.to_string() }))
            }
            AppError::Booking(err @ BookingError::AlreadyProcessed(_)) => {
                (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
            }
            AppError::Booking(BookingError::Persistence(msg)) => {
                tracing::error!("Persistence failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::Catalog(err @ CatalogError::ScheduleConflict { .. }) => {
                (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
            }
            AppError::Catalog(
                err @ (CatalogError::ScreeningNotFound(_) | CatalogError::AuditoriumNotFound(_)),
            ) => (StatusCode::NOT_FOUND, json!({ "error": err.to_string() })),
            AppError::Catalog(err @ CatalogError::InvalidLayout) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            AppError::Payment(err) => (
                StatusCode::PAYMENT_REQUIRED,
                json!({ "error": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
