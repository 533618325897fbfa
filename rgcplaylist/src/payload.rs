//! RenderPayload : le seul artefact qu'un item doit savoir produire.
//!
//! Opaque pour la playlist et le pool de rendu au-delà de son tag `kind` ;
//! seul le moteur de rendu distant interprète le contenu.

use serde::{Deserialize, Serialize};

/// Instruction de rendu produite par un item actif.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderPayload {
    /// Gabarit HTML/graphique chargé avec ses données JSON.
    Template {
        template: String,
        data: serde_json::Value,
    },
    /// Clip média connu du renderer, ou URL brute.
    Media {
        #[serde(skip_serializing_if = "Option::is_none")]
        clip: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Lignes de commandes brutes transmises telles quelles au renderer.
    Commands { lines: Vec<String> },
}

impl RenderPayload {
    /// Nom du tag, utilisé dans les logs de diagnostic.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderPayload::Template { .. } => "template",
            RenderPayload::Media { .. } => "media",
            RenderPayload::Commands { .. } => "commands",
        }
    }
}
