//! Item média : un clip connu du renderer ou une URL brute.

use serde::{Deserialize, Serialize};

use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Nom de clip côté renderer, ou URL (`http://`, `https://`, `file://`).
    pub source: String,
}

pub struct MediaItem {
    pub props: MediaProps,
}

impl MediaItem {
    pub fn new(props: MediaProps) -> Self {
        Self { props }
    }

    fn is_url(source: &str) -> bool {
        source.starts_with("http://")
            || source.starts_with("https://")
            || source.starts_with("file://")
    }

    pub fn create_render_payload(&self) -> RenderPayload {
        if Self::is_url(&self.props.source) {
            RenderPayload::Media {
                clip: None,
                url: Some(self.props.source.clone()),
            }
        } else {
            RenderPayload::Media {
                clip: Some(self.props.source.clone()),
                url: None,
            }
        }
    }

    pub fn update(&mut self, props: MediaProps) {
        self.props = props;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_name_payload() {
        let item = MediaItem::new(MediaProps {
            caption: "Intro".to_string(),
            color: String::new(),
            source: "AMB/INTRO_LOOP".to_string(),
        });
        assert_eq!(
            item.create_render_payload(),
            RenderPayload::Media {
                clip: Some("AMB/INTRO_LOOP".to_string()),
                url: None,
            }
        );
    }

    #[test]
    fn test_url_payload() {
        let item = MediaItem::new(MediaProps {
            caption: "Stream".to_string(),
            color: String::new(),
            source: "https://example.org/loop.webm".to_string(),
        });
        assert_eq!(
            item.create_render_payload(),
            RenderPayload::Media {
                clip: None,
                url: Some("https://example.org/loop.webm".to_string()),
            }
        );
    }
}
