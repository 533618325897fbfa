//! Item lecture biblique : une pseudo-slide de citation.
//!
//! Le texte du passage est fourni déjà extrait par le client ; la citation
//! est reconstruite ici avec le style configuré (plages de versets
//! consécutifs repliées, séparateurs du gabarit).

use serde::{Deserialize, Serialize};

use crate::citation::ChapterVerses;
use crate::item::ItemContext;
use crate::payload::RenderPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibleProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Nom du livre tel qu'affiché ("Johannes", "Psalm"...).
    pub book: String,
    /// Chapitres et versets sélectionnés.
    pub passages: Vec<ChapterVerses>,
    /// Texte du passage, déjà extrait par le fournisseur de contenu.
    pub text: String,
}

pub struct BibleItem {
    pub props: BibleProps,
    citation: String,
}

impl BibleItem {
    pub fn new(props: BibleProps, ctx: &ItemContext<'_>) -> Self {
        let citation = Self::build_citation(&props, ctx);
        Self { props, citation }
    }

    fn build_citation(props: &BibleProps, ctx: &ItemContext<'_>) -> String {
        let refs = ctx.citation_style.format(&props.passages);
        if refs.is_empty() {
            props.book.clone()
        } else {
            format!("{} {}", props.book, refs)
        }
    }

    pub fn citation(&self) -> &str {
        &self.citation
    }

    pub fn create_render_payload(&self) -> RenderPayload {
        RenderPayload::Template {
            template: "bible".to_string(),
            data: serde_json::json!({
                "citation": self.citation,
                "text": self.props.text,
            }),
        }
    }

    pub fn update(&mut self, props: BibleProps, ctx: &ItemContext<'_>) {
        self.props = props;
        self.citation = Self::build_citation(&self.props, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationStyle;
    use crate::content::EmptyLibrary;

    fn ctx<'a>(style: &'a CitationStyle, lib: &'a EmptyLibrary) -> ItemContext<'a> {
        ItemContext {
            citation_style: style,
            songs: lib,
            psalms: lib,
            default_language: "de",
        }
    }

    #[test]
    fn test_citation_uses_configured_style() {
        let style = CitationStyle::parse("1,2–3.4;5,6").unwrap();
        let lib = EmptyLibrary;
        let item = BibleItem::new(
            BibleProps {
                caption: String::new(),
                color: String::new(),
                book: "Johannes".to_string(),
                passages: vec![ChapterVerses {
                    chapter: 3,
                    verses: vec![16, 17, 18, 20],
                }],
                text: "Denn also hat Gott die Welt geliebt...".to_string(),
            },
            &ctx(&style, &lib),
        );

        assert_eq!(item.citation(), "Johannes 3,16–18.20");
    }

    #[test]
    fn test_payload_is_single_citation_slide() {
        let style = CitationStyle::default();
        let lib = EmptyLibrary;
        let item = BibleItem::new(
            BibleProps {
                caption: String::new(),
                color: String::new(),
                book: "Psalm".to_string(),
                passages: vec![ChapterVerses {
                    chapter: 23,
                    verses: vec![],
                }],
                text: "Der Herr ist mein Hirte".to_string(),
            },
            &ctx(&style, &lib),
        );

        match item.create_render_payload() {
            RenderPayload::Template { template, data } => {
                assert_eq!(template, "bible");
                assert_eq!(data["citation"], "Psalm 23");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
