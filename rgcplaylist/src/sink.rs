//! Seam entre la playlist et la couche de synchronisation des renderers.
//!
//! Le pool de cibles de rendu implémente ce trait ; la playlist le reçoit
//! en handle à la construction (pas de singleton module-level). Toutes les
//! méthodes sont fire-and-forget : elles enfilent le travail réseau et
//! rendent la main immédiatement.

use crate::payload::RenderPayload;

pub trait RenderSink: Send + Sync {
    /// Chargement complet d'un nouvel item (double-buffer : background-load,
    /// foreground-clear, swap).
    fn play(&self, payload: RenderPayload);

    /// Mise à jour des données du gabarit déjà chargé (pas de rechargement).
    fn update(&self, payload: RenderPayload);

    /// Changement de slide au sein de l'item courant.
    fn select_slide(&self, slide: usize, payload: RenderPayload);

    /// Affiche ou masque la couche de premier plan.
    fn set_visibility(&self, visible: bool);

    /// État de visibilité courant.
    fn visibility(&self) -> bool;

    /// Lignes de commandes brutes (items RawCommand, libération de
    /// ressources au stop).
    fn send_commands(&self, lines: Vec<String>);

    /// Plus aucun item actif : vide les couches de tous les renderers.
    fn clear(&self);
}

/// Sink inerte : utilisé quand aucun renderer n'est configuré et dans les
/// tests du moteur de playlist.
#[derive(Debug, Default)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn play(&self, _payload: RenderPayload) {}
    fn update(&self, _payload: RenderPayload) {}
    fn select_slide(&self, _slide: usize, _payload: RenderPayload) {}
    fn set_visibility(&self, _visible: bool) {}
    fn visibility(&self) -> bool {
        true
    }
    fn send_commands(&self, _lines: Vec<String>) {}
    fn clear(&self) {}
}
