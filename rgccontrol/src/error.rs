use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    // Réponse AMCP avec un code d'erreur (4xx/5xx)
    #[error("Renderer replied {code} to `{command}`")]
    Protocol { code: u16, command: String },

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("Renderer is disconnected")]
    Disconnected,

    #[error("Unsupported payload kind `{0}`")]
    UnsupportedPayload(&'static str),

    #[error("Clip `{0}` is not in the renderer media inventory")]
    UnknownClip(String),

    #[error("Invalid renderer reply: {0}")]
    BadReply(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour rgccontrol
pub type Result<T> = std::result::Result<T, RenderError>;
