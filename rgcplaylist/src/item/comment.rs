//! Item commentaire : pure annotation de playlist, jamais affichable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
}

pub struct CommentItem {
    pub props: CommentProps,
}

impl CommentItem {
    pub fn new(props: CommentProps) -> Self {
        Self { props }
    }
}
