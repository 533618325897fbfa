//! Seam de transport vers un renderer.
//!
//! Le trait est implémenté par la connexion TCP réelle et par les mocks
//! des tests de protocole (ordre des commandes, resynchronisation).

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::protocol::Reply;

/// État de connexion observable d'un renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

#[async_trait]
pub trait RenderConnection: Send + Sync {
    /// Envoie une commande et attend la réponse (avec timeout côté
    /// implémentation). Un code d'erreur AMCP est une `Err(Protocol)`.
    async fn send(&self, command: String) -> Result<Reply>;

    /// Canal d'observation des transitions connecté/déconnecté.
    fn connectivity(&self) -> watch::Receiver<Connectivity>;
}

/// Connexion définitivement hors service.
///
/// Utilisée quand la configuration d'une cible est inutilisable : la cible
/// est dégradée en stub plutôt que de faire échouer tout le pool.
pub struct StubConnection {
    state_rx: watch::Receiver<Connectivity>,
    // Conserver l'émetteur pour que le canal reste ouvert.
    _state_tx: watch::Sender<Connectivity>,
}

impl StubConnection {
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(Connectivity::Disconnected);
        Self {
            state_rx,
            _state_tx: state_tx,
        }
    }
}

impl Default for StubConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderConnection for StubConnection {
    async fn send(&self, _command: String) -> Result<Reply> {
        Err(crate::error::RenderError::Disconnected)
    }

    fn connectivity(&self) -> watch::Receiver<Connectivity> {
        self.state_rx.clone()
    }
}
