//! Item chant : titre + parties résolues par l'ordre des couplets.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::SongData;
use crate::error::Result;
use crate::item::ItemContext;
use crate::payload::RenderPayload;

/// Propriétés client d'un chant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongProps {
    pub caption: String,
    #[serde(default)]
    pub color: String,
    /// Référence du fichier de chant dans la bibliothèque.
    pub file: String,
    /// Ordre des parties, sinon celui du fichier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_order: Option<Vec<String>>,
    /// Langues affichées, sinon celles du fichier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

pub struct SongItem {
    pub props: SongProps,
    data: Option<SongData>,
    /// Indices dans `data.parts`, dans l'ordre de rendu effectif.
    order: Vec<usize>,
    pub(crate) active_slide: usize,
}

impl SongItem {
    pub fn new(props: SongProps, ctx: &ItemContext<'_>) -> Self {
        let data = match ctx.songs.load_song(&props.file) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(file = %props.file, "Failed to load song, item stays non-displayable: {}", err);
                None
            }
        };

        let order = data
            .as_ref()
            .map(|d| Self::resolve_order(d, props.verse_order.as_deref()))
            .unwrap_or_default();

        Self {
            props,
            data,
            order,
            active_slide: 0,
        }
    }

    /// Résout l'ordre des couplets en indices de parties ; les entrées
    /// inconnues sont ignorées, pas des erreurs.
    fn resolve_order(data: &SongData, override_order: Option<&[String]>) -> Vec<usize> {
        let effective: &[String] = override_order.unwrap_or(&data.verse_order);

        effective
            .iter()
            .filter_map(|name| {
                let found = data.parts.iter().position(|p| &p.name == name);
                if found.is_none() {
                    debug!(part = %name, title = %data.title, "Unknown verse-order entry skipped");
                }
                found
            })
            .collect()
    }

    pub fn caption(&self) -> &str {
        if !self.props.caption.is_empty() {
            return &self.props.caption;
        }
        self.data.as_ref().map(|d| d.title.as_str()).unwrap_or("")
    }

    pub fn displayable(&self) -> bool {
        self.data.is_some()
    }

    /// 1 slide de titre + les slides de chaque partie résolue.
    pub fn slide_count(&self) -> usize {
        match &self.data {
            Some(data) => {
                1 + self
                    .order
                    .iter()
                    .map(|&i| data.parts[i].slides.len())
                    .sum::<usize>()
            }
            None => 0,
        }
    }

    fn effective_languages<'a>(&'a self, data: &'a SongData) -> &'a [String] {
        match &self.props.languages {
            Some(langs) if !langs.is_empty() => langs,
            _ => &data.languages,
        }
    }

    pub fn create_render_payload(&self) -> Result<RenderPayload> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| crate::error::PlaylistError::Content(format!(
                "song `{}` has no loaded content",
                self.props.file
            )))?;

        let parts: Vec<serde_json::Value> = self
            .order
            .iter()
            .map(|&i| {
                let part = &data.parts[i];
                serde_json::json!({
                    "name": part.name,
                    "slides": part.slides.iter().map(|s| &s.lines).collect::<Vec<_>>(),
                })
            })
            .collect();

        Ok(RenderPayload::Template {
            template: "song".to_string(),
            data: serde_json::json!({
                "title": data.title,
                "languages": self.effective_languages(data),
                "active": self.active_slide,
                "parts": parts,
            }),
        })
    }

    pub fn update(&mut self, props: SongProps, ctx: &ItemContext<'_>) {
        let reload = props.file != self.props.file;
        self.props = props;

        if reload {
            self.data = match ctx.songs.load_song(&self.props.file) {
                Ok(data) => Some(data),
                Err(err) => {
                    warn!(file = %self.props.file, "Failed to reload song: {}", err);
                    None
                }
            };
        }

        self.order = self
            .data
            .as_ref()
            .map(|d| Self::resolve_order(d, self.props.verse_order.as_deref()))
            .unwrap_or_default();

        // Conserver le slide actif, ramené dans la nouvelle plage.
        let count = self.slide_count();
        if count > 0 && self.active_slide >= count {
            self.active_slide = count - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationStyle;
    use crate::content::{PsalmData, PsalmLibrary, SongLibrary, SongPart, SongSlide};

    struct FixedSongs(SongData);

    impl SongLibrary for FixedSongs {
        fn load_song(&self, _file: &str) -> anyhow::Result<SongData> {
            Ok(self.0.clone())
        }
    }

    struct NoPsalms;

    impl PsalmLibrary for NoPsalms {
        fn load_psalm(&self, _file: &str) -> anyhow::Result<PsalmData> {
            Err(anyhow::anyhow!("none"))
        }
    }

    fn part(name: &str, slides: usize) -> SongPart {
        SongPart {
            name: name.to_string(),
            slides: (0..slides)
                .map(|i| SongSlide {
                    lines: vec![vec![format!("{} line {}", name, i)]],
                })
                .collect(),
        }
    }

    fn sample_data() -> SongData {
        SongData {
            title: "Amazing Grace".to_string(),
            parts: vec![part("verse 1", 2), part("chorus", 1), part("verse 2", 2)],
            verse_order: vec![
                "verse 1".to_string(),
                "chorus".to_string(),
                "verse 2".to_string(),
                "chorus".to_string(),
            ],
            languages: vec!["en".to_string()],
        }
    }

    fn ctx_with<'a>(
        style: &'a CitationStyle,
        songs: &'a FixedSongs,
        psalms: &'a NoPsalms,
    ) -> ItemContext<'a> {
        ItemContext {
            citation_style: style,
            songs,
            psalms,
            default_language: "en",
        }
    }

    fn props(file: &str) -> SongProps {
        SongProps {
            caption: String::new(),
            color: "#0000ff".to_string(),
            file: file.to_string(),
            verse_order: None,
            languages: None,
        }
    }

    #[test]
    fn test_slide_count_is_title_plus_ordered_parts() {
        let style = CitationStyle::default();
        let songs = FixedSongs(sample_data());
        let psalms = NoPsalms;
        let item = SongItem::new(props("grace.song"), &ctx_with(&style, &songs, &psalms));

        // 1 titre + 2 + 1 + 2 + 1 (chorus répété).
        assert_eq!(item.slide_count(), 7);
        assert!(item.displayable());
        assert_eq!(item.caption(), "Amazing Grace");
    }

    #[test]
    fn test_unknown_verse_order_entries_are_skipped() {
        let style = CitationStyle::default();
        let songs = FixedSongs(sample_data());
        let psalms = NoPsalms;
        let mut p = props("grace.song");
        p.verse_order = Some(vec![
            "verse 1".to_string(),
            "bridge".to_string(), // inconnue
            "chorus".to_string(),
        ]);
        let item = SongItem::new(p, &ctx_with(&style, &songs, &psalms));

        assert_eq!(item.slide_count(), 1 + 2 + 1);
    }

    #[test]
    fn test_payload_carries_active_slide_and_languages() {
        let style = CitationStyle::default();
        let songs = FixedSongs(sample_data());
        let psalms = NoPsalms;
        let mut item = SongItem::new(props("grace.song"), &ctx_with(&style, &songs, &psalms));
        item.active_slide = 3;

        match item.create_render_payload().unwrap() {
            RenderPayload::Template { template, data } => {
                assert_eq!(template, "song");
                assert_eq!(data["active"], 3);
                assert_eq!(data["languages"][0], "en");
                assert_eq!(data["title"], "Amazing Grace");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
