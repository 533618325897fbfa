//! Snapshot client : l'état canonique diffusé aux clients de contrôle.

use serde::{Deserialize, Serialize};

use crate::item::ItemType;

/// Pointeur item/slide actif, unique source de vérité diffusée aux clients
/// et répliquée sur les renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveItemSlide {
    pub item: Option<usize>,
    pub slide: Option<usize>,
}

/// Résumé d'un item tel que vu par les clients de contrôle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub caption: String,
    pub color: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub displayable: bool,
    pub slide_count: usize,
}

/// Snapshot complet de la playlist pour les clients de contrôle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub caption: String,
    pub items: Vec<ItemSummary>,
    pub active: ActiveItemSlide,
    pub visible: bool,
    pub unsaved_changes: bool,
}
