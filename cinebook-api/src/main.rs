use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinebook_api::{app, AppState};
use cinebook_booking::{BookingPolicy, ReservationEngine};
use cinebook_core::clock::SystemClock;
use cinebook_core::payment::MockPaymentAdapter;
use cinebook_store::app_config::Config;
use cinebook_store::{EventBroadcaster, MemoryReservationStore, ScreeningBoard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinebook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Cinebook API on port {}", config.server.port);

    let board = Arc::new(ScreeningBoard::new());
    let store = Arc::new(MemoryReservationStore::new());
    let events = Arc::new(EventBroadcaster::new(
        config.business_rules.event_channel_capacity,
    ));

    let engine = Arc::new(ReservationEngine::new(
        board.clone(),
        store.clone(),
        events.clone(),
        Arc::new(SystemClock),
        BookingPolicy::from_seconds(config.business_rules.hold_ttl_seconds as i64),
    ));

    let restored = engine.rehydrate().await?;
    if restored > 0 {
        tracing::info!(restored, "Rehydrated reservations from store");
    }

    tokio::spawn(cinebook_api::sweeper::run(
        engine.clone(),
        Duration::from_secs(config.business_rules.sweep_interval_seconds),
    ));

    let state = AppState {
        engine,
        board,
        events,
        payments: Arc::new(MockPaymentAdapter),
    };
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
