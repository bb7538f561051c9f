use std::sync::Arc;

use cinebook_booking::ReservationEngine;
use cinebook_core::payment::PaymentAdapter;
use cinebook_store::{EventBroadcaster, ScreeningBoard};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub board: Arc<ScreeningBoard>,
    pub events: Arc<EventBroadcaster>,
    pub payments: Arc<dyn PaymentAdapter>,
}
