//! SSE pour refléter l'état de la playlist chez tous les clients.
//!
//! Route type : `GET /api/playlist/events`

use std::sync::Arc;

use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::broadcast::SessionEvent;
use crate::session::Session;

/// Handler SSE : snapshot complet à la connexion, puis miroir de chaque
/// changement d'état.
pub async fn playlist_events_sse(State(session): State<Arc<Session>>) -> impl IntoResponse {
    let client_id = Uuid::new_v4();
    let mut rx = session.subscribe();

    // Snapshot initial : le nouveau client part de l'état courant.
    let initial = SessionEvent {
        snapshot: session.snapshot().await,
        timestamp: Utc::now(),
    };
    debug!(client = %client_id, "Control client connected");

    let stream = stream! {
        if let Ok(json) = serde_json::to_string(&initial) {
            yield Ok::<_, axum::Error>(Event::default().event("snapshot").data(json));
        }

        while let Ok(event) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&event) {
                yield Ok::<_, axum::Error>(Event::default().event("snapshot").data(json));
            }
        }

        debug!(client = %client_id, "Control client stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
