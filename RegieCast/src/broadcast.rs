//! Diffusion des snapshots vers les clients de contrôle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use rgcplaylist::ClientSnapshot;

/// Evènement enrichi diffusé aux clients (snapshot + timestamp).
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    pub snapshot: ClientSnapshot,
    pub timestamp: DateTime<Utc>,
}

/// Bus de diffusion : chaque client SSE tient un receiver.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(256).0,
        }
    }

    /// Diffuse un snapshot à tous les clients connectés (ignoré si aucun
    /// abonné).
    pub fn notify(&self, snapshot: ClientSnapshot) {
        let _ = self.tx.send(SessionEvent {
            snapshot,
            timestamp: Utc::now(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
