//! Item PDF : une slide par page rasterisée.
//!
//! La rasterisation est faite par un collaborateur externe qui signale les
//! pages au fil de l'eau ; tant qu'aucune page n'est arrivée l'item n'est
//! pas affichable. Chaque page devient un clip `<stem>_pNN` côté renderer.

use serde::{Deserialize, Serialize};

use crate::error::{PlaylistError, Result};
use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Référence du fichier PDF.
    pub file: String,
}

pub struct PdfItem {
    pub props: PdfProps,
    pages: usize,
    pub(crate) active_slide: usize,
}

impl PdfItem {
    pub fn new(props: PdfProps) -> Self {
        Self {
            props,
            pages: 0,
            active_slide: 0,
        }
    }

    pub fn displayable(&self) -> bool {
        self.pages > 0
    }

    pub fn slide_count(&self) -> usize {
        self.pages
    }

    /// Pages supplémentaires rasterisées par le collaborateur.
    pub fn add_pages(&mut self, pages: usize) {
        self.pages += pages;
    }

    fn clip_stem(&self) -> &str {
        let name = self
            .props
            .file
            .rsplit('/')
            .next()
            .unwrap_or(&self.props.file);
        name.strip_suffix(".pdf").unwrap_or(name)
    }

    pub fn create_render_payload(&self) -> Result<RenderPayload> {
        if self.pages == 0 {
            return Err(PlaylistError::Content(format!(
                "pdf `{}` has no rasterized page yet",
                self.props.file
            )));
        }

        Ok(RenderPayload::Media {
            clip: Some(format!("{}_p{:02}", self.clip_stem(), self.active_slide + 1)),
            url: None,
        })
    }

    pub fn update(&mut self, props: PdfProps) {
        let reset = props.file != self.props.file;
        self.props = props;
        if reset {
            // Nouveau fichier : les pages déjà rasterisées ne valent plus.
            self.pages = 0;
            self.active_slide = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> PdfItem {
        PdfItem::new(PdfProps {
            caption: "Annonces".to_string(),
            color: String::new(),
            file: "docs/annonces.pdf".to_string(),
        })
    }

    #[test]
    fn test_not_displayable_until_first_page() {
        let mut pdf = item();
        assert!(!pdf.displayable());
        assert!(pdf.create_render_payload().is_err());

        pdf.add_pages(1);
        assert!(pdf.displayable());
        assert_eq!(pdf.slide_count(), 1);
    }

    #[test]
    fn test_pages_arrive_incrementally() {
        let mut pdf = item();
        pdf.add_pages(2);
        pdf.add_pages(3);
        assert_eq!(pdf.slide_count(), 5);
    }

    #[test]
    fn test_payload_points_at_page_clip() {
        let mut pdf = item();
        pdf.add_pages(4);
        pdf.active_slide = 2;

        assert_eq!(
            pdf.create_render_payload().unwrap(),
            RenderPayload::Media {
                clip: Some("annonces_p03".to_string()),
                url: None,
            }
        );
    }
}
