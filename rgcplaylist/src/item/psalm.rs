//! Item psaume : slides issues du contenu parsé.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::content::PsalmData;
use crate::error::{PlaylistError, Result};
use crate::item::ItemContext;
use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsalmProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Référence du fichier de psaume dans la bibliothèque.
    pub file: String,
}

pub struct PsalmItem {
    pub props: PsalmProps,
    data: Option<PsalmData>,
    pub(crate) active_slide: usize,
}

impl PsalmItem {
    pub fn new(props: PsalmProps, ctx: &ItemContext<'_>) -> Self {
        let data = match ctx.psalms.load_psalm(&props.file) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(file = %props.file, "Failed to load psalm, item stays non-displayable: {}", err);
                None
            }
        };

        Self {
            props,
            data,
            active_slide: 0,
        }
    }

    pub fn caption(&self) -> &str {
        if !self.props.caption.is_empty() {
            return &self.props.caption;
        }
        self.data.as_ref().map(|d| d.caption.as_str()).unwrap_or("")
    }

    pub fn displayable(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.slides.is_empty())
    }

    pub fn slide_count(&self) -> usize {
        self.data.as_ref().map(|d| d.slides.len()).unwrap_or(0)
    }

    pub fn create_render_payload(&self) -> Result<RenderPayload> {
        let data = self.data.as_ref().ok_or_else(|| {
            PlaylistError::Content(format!("psalm `{}` has no loaded content", self.props.file))
        })?;

        Ok(RenderPayload::Template {
            template: "psalm".to_string(),
            data: serde_json::json!({
                "caption": self.caption(),
                "active": self.active_slide,
                "slides": data.slides,
            }),
        })
    }

    pub fn update(&mut self, props: PsalmProps, ctx: &ItemContext<'_>) {
        let reload = props.file != self.props.file;
        self.props = props;

        if reload {
            self.data = match ctx.psalms.load_psalm(&self.props.file) {
                Ok(data) => Some(data),
                Err(err) => {
                    warn!(file = %self.props.file, "Failed to reload psalm: {}", err);
                    None
                }
            };
            self.active_slide = 0;
        }

        let count = self.slide_count();
        if count > 0 && self.active_slide >= count {
            self.active_slide = count - 1;
        }
    }
}
