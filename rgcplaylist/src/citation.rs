//! Formatage des citations bibliques.
//!
//! Les séparateurs sont extraits une seule fois, au démarrage, d'un gabarit
//! lisible du type `"1, 2-3.4; 5, 6"` : les chiffres 1 à 6 sont des ancres
//! fixes, le texte entre deux ancres successives définit le séparateur
//! correspondant.

use anyhow::anyhow;

use crate::error::{PlaylistError, Result};

/// Un chapitre et la liste de ses versets sélectionnés.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChapterVerses {
    pub chapter: u32,
    pub verses: Vec<u32>,
}

/// Séparateurs d'un style de citation.
///
/// Gabarit de référence : `1, 2-3.4; 5, 6`
/// - entre `1` et `2` : séparateur chapitre/versets
/// - entre `2` et `3` : marqueur de plage de versets consécutifs
/// - entre `3` et `4` : séparateur de versets non consécutifs
/// - entre `4` et `5` : séparateur de chapitres
/// - entre `5` et `6` : doit répéter le séparateur chapitre/versets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationStyle {
    sep_chapter_verse: String,
    range_verse: String,
    sep_verse: String,
    sep_chapter: String,
}

const ANCHORS: [char; 6] = ['1', '2', '3', '4', '5', '6'];

impl Default for CitationStyle {
    fn default() -> Self {
        Self {
            sep_chapter_verse: ", ".to_string(),
            range_verse: "-".to_string(),
            sep_verse: ".".to_string(),
            sep_chapter: "; ".to_string(),
        }
    }
}

impl CitationStyle {
    /// Extrait les séparateurs du gabarit à ancres.
    pub fn parse(template: &str) -> Result<Self> {
        let mut positions = Vec::with_capacity(ANCHORS.len());
        for anchor in ANCHORS {
            let pos = template
                .find(anchor)
                .ok_or_else(|| anyhow!("Citation style `{}` misses anchor {}", template, anchor))?;
            positions.push(pos);
        }

        // Les ancres doivent apparaître dans l'ordre.
        if positions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PlaylistError::Content(format!(
                "Citation style `{}` has out-of-order anchors",
                template
            )));
        }

        let between = |a: usize, b: usize| template[positions[a] + 1..positions[b]].to_string();

        let style = Self {
            sep_chapter_verse: between(0, 1),
            range_verse: between(1, 2),
            sep_verse: between(2, 3),
            sep_chapter: between(3, 4),
        };

        // L'ancre 5-6 répète le séparateur chapitre/versets ; une divergence
        // signale un gabarit incohérent.
        if between(4, 5) != style.sep_chapter_verse {
            return Err(PlaylistError::Content(format!(
                "Citation style `{}` is inconsistent between chapters",
                template
            )));
        }

        Ok(style)
    }

    /// Formate une liste de chapitres/versets, sans le nom du livre.
    ///
    /// Les suites de versets consécutifs d'un même chapitre sont repliées en
    /// plage `début–fin`.
    pub fn format(&self, chapters: &[ChapterVerses]) -> String {
        let mut out = String::new();

        for (i, chapter) in chapters.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.sep_chapter);
            }
            out.push_str(&chapter.chapter.to_string());

            if chapter.verses.is_empty() {
                continue;
            }
            out.push_str(&self.sep_chapter_verse);
            out.push_str(&self.format_verse_runs(&chapter.verses));
        }

        out
    }

    fn format_verse_runs(&self, verses: &[u32]) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < verses.len() {
            // Étendre la plage tant que les versets se suivent.
            let start = i;
            while i + 1 < verses.len() && verses[i + 1] == verses[i] + 1 {
                i += 1;
            }

            if start > 0 {
                out.push_str(&self.sep_verse);
            }
            out.push_str(&verses[start].to_string());
            if i > start {
                out.push_str(&self.range_verse);
                out.push_str(&verses[i].to_string());
            }

            i += 1;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(chapter: u32, verses: &[u32]) -> ChapterVerses {
        ChapterVerses {
            chapter,
            verses: verses.to_vec(),
        }
    }

    #[test]
    fn test_parse_default_template() {
        let style = CitationStyle::parse("1, 2-3.4; 5, 6").unwrap();
        assert_eq!(style, CitationStyle::default());
    }

    #[test]
    fn test_parse_compact_template() {
        let style = CitationStyle::parse("1,2–3.4;5,6").unwrap();
        assert_eq!(style.sep_chapter_verse, ",");
        assert_eq!(style.range_verse, "–");
        assert_eq!(style.sep_verse, ".");
        assert_eq!(style.sep_chapter, ";");
    }

    #[test]
    fn test_parse_rejects_missing_anchor() {
        assert!(CitationStyle::parse("1, 2-3.4; 5").is_err());
    }

    #[test]
    fn test_parse_rejects_inconsistent_chapter_verse_separator() {
        // `5:6` contredit `1, 2`.
        assert!(CitationStyle::parse("1, 2-3.4; 5:6").is_err());
    }

    #[test]
    fn test_format_collapses_consecutive_runs() {
        let style = CitationStyle::parse("1,2–3.4;5,6").unwrap();
        let formatted = style.format(&[chapter(3, &[5, 6, 7, 9])]);
        assert_eq!(formatted, "3,5–7.9");
    }

    #[test]
    fn test_format_multiple_chapters() {
        let style = CitationStyle::parse("1,2–3.4;5,6").unwrap();
        let formatted = style.format(&[chapter(3, &[1, 2]), chapter(4, &[1])]);
        assert_eq!(formatted, "3,1–2;4,1");
    }

    #[test]
    fn test_format_chapter_without_verses() {
        let style = CitationStyle::default();
        assert_eq!(style.format(&[chapter(117, &[])]), "117");
    }

    #[test]
    fn test_format_single_verses_joined() {
        let style = CitationStyle::parse("1,2–3.4;5,6").unwrap();
        assert_eq!(style.format(&[chapter(1, &[2, 4, 6])]), "1,2.4.6");
    }
}
