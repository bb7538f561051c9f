use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info};

use cinebook_booking::ReservationEngine;

/// Background task that periodically releases expired holds.
///
/// The sweep serializes through the same per-screening locks as user
/// operations and the engine logs-and-continues past individual failures,
/// so this loop only has to keep ticking.
pub async fn run(engine: Arc<ReservationEngine>, period: Duration) {
    let mut ticker = interval(period);
    info!(period_seconds = period.as_secs(), "Expiry sweeper started");

    loop {
        ticker.tick().await;
        let expired = engine.expire_due().await;
        if expired > 0 {
            info!(expired, "Released expired holds");
        } else {
            debug!("Sweep found no due holds");
        }
    }
}
