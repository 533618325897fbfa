//! Item commandes brutes : lignes envoyées telles quelles au renderer.
//!
//! Seule variante dont le `stop()` fait quelque chose : les commandes de
//! désactivation libèrent l'état que l'activation a installé côté renderer.

use serde::{Deserialize, Serialize};

use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCommandProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Commandes émises à l'activation.
    pub on_play: Vec<String>,
    /// Commandes émises quand l'item cesse d'être actif.
    #[serde(default)]
    pub on_stop: Vec<String>,
}

pub struct RawCommandItem {
    pub props: RawCommandProps,
}

impl RawCommandItem {
    pub fn new(props: RawCommandProps) -> Self {
        Self { props }
    }

    pub fn create_render_payload(&self) -> RenderPayload {
        RenderPayload::Commands {
            lines: self.props.on_play.clone(),
        }
    }

    pub fn stop(&mut self) -> Vec<String> {
        self.props.on_stop.clone()
    }
}
