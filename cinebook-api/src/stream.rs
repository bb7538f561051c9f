use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/screenings/{id}/events", get(screening_events))
}

/// Live feed of seat-state changes for one screening, so seat-picker clients
/// can update without polling. Events for other screenings are filtered out
/// of this subscriber's stream.
async fn screening_events(
    State(state): State<AppState>,
    Path(screening_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.screening_id() == screening_id => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok::<_, Infallible>(
                    Event::default().event("booking").data(data),
                ))
            }
            // Wrong screening, or this subscriber lagged the channel
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
