//! Types d'erreurs pour rgcplaylist

use crate::item::ItemType;

/// Erreurs du moteur de playlist
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("Invalid item number {index} for playlist of length {len}")]
    InvalidItemIndex { index: i64, len: usize },

    #[error("Invalid slide number {slide} for item with {count} slides")]
    InvalidSlideIndex { slide: i64, count: usize },

    #[error("Item type mismatch: item is {expected}, props are {got}")]
    TypeMismatch { expected: ItemType, got: ItemType },

    #[error("Item {index} is not displayable")]
    NotDisplayable { index: usize },

    #[error("No displayable item to navigate to")]
    NoDisplayableItems,

    #[error("No item is active")]
    NoActiveItem,

    #[error("Content error: {0}")]
    Content(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour rgcplaylist
pub type Result<T> = std::result::Result<T, PlaylistError>;
