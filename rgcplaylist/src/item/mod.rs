//! Items de playlist : une implémentation par type de contenu.
//!
//! Le contrat est porté par un type somme ([`PlaylistItem`]) avec dispatch
//! par `match` : chaque variante garde ses invariants pour elle, aucune
//! n'hérite d'état partagé. Toutes produisent le même artefact de rendu
//! ([`RenderPayload`](crate::payload::RenderPayload)).

pub mod bible;
pub mod comment;
pub mod countdown;
pub mod media;
pub mod pdf;
pub mod psalm;
pub mod rawcommand;
pub mod song;
pub mod template;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::citation::CitationStyle;
use crate::content::{PsalmLibrary, SongLibrary};
use crate::error::{PlaylistError, Result};
use crate::payload::RenderPayload;
use crate::snapshot::ItemSummary;

pub use bible::{BibleItem, BibleProps};
pub use comment::{CommentItem, CommentProps};
pub use countdown::{CountdownItem, CountdownMode, CountdownProps};
pub use media::{MediaItem, MediaProps};
pub use pdf::{PdfItem, PdfProps};
pub use psalm::{PsalmItem, PsalmProps};
pub use rawcommand::{RawCommandItem, RawCommandProps};
pub use song::{SongItem, SongProps};
pub use template::{TemplateItem, TemplateProps};

/// Tag de type d'item, tel qu'échangé avec les clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Song,
    Psalm,
    Bible,
    Countdown,
    Media,
    Pdf,
    Template,
    Comment,
    RawCommand,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Song => "song",
            ItemType::Psalm => "psalm",
            ItemType::Bible => "bible",
            ItemType::Countdown => "countdown",
            ItemType::Media => "media",
            ItemType::Pdf => "pdf",
            ItemType::Template => "template",
            ItemType::Comment => "comment",
            ItemType::RawCommand => "raw_command",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Propriétés d'un item, taguées par `type`.
///
/// C'est la forme que les clients envoient (`add_item`, `update_item`) et
/// la vue en lecture seule qu'ils reçoivent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemProps {
    Song(SongProps),
    Psalm(PsalmProps),
    Bible(BibleProps),
    Countdown(CountdownProps),
    Media(MediaProps),
    Pdf(PdfProps),
    Template(TemplateProps),
    Comment(CommentProps),
    RawCommand(RawCommandProps),
}

impl ItemProps {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemProps::Song(_) => ItemType::Song,
            ItemProps::Psalm(_) => ItemType::Psalm,
            ItemProps::Bible(_) => ItemType::Bible,
            ItemProps::Countdown(_) => ItemType::Countdown,
            ItemProps::Media(_) => ItemType::Media,
            ItemProps::Pdf(_) => ItemType::Pdf,
            ItemProps::Template(_) => ItemType::Template,
            ItemProps::Comment(_) => ItemType::Comment,
            ItemProps::RawCommand(_) => ItemType::RawCommand,
        }
    }
}

/// Contexte de construction des items : style de citation parsé au
/// démarrage et fournisseurs de contenu.
pub struct ItemContext<'a> {
    pub citation_style: &'a CitationStyle,
    pub songs: &'a dyn SongLibrary,
    pub psalms: &'a dyn PsalmLibrary,
    pub default_language: &'a str,
}

/// Un item de playlist.
pub enum PlaylistItem {
    Song(SongItem),
    Psalm(PsalmItem),
    Bible(BibleItem),
    Countdown(CountdownItem),
    Media(MediaItem),
    Pdf(PdfItem),
    Template(TemplateItem),
    Comment(CommentItem),
    RawCommand(RawCommandItem),
}

impl PlaylistItem {
    /// Construit l'item correspondant au tag des props.
    ///
    /// Un contenu introuvable ou invalide produit un item non affichable,
    /// jamais une erreur : un fichier cassé ne bloque pas la playlist.
    pub fn from_props(props: ItemProps, ctx: &ItemContext<'_>) -> Self {
        match props {
            ItemProps::Song(p) => PlaylistItem::Song(SongItem::new(p, ctx)),
            ItemProps::Psalm(p) => PlaylistItem::Psalm(PsalmItem::new(p, ctx)),
            ItemProps::Bible(p) => PlaylistItem::Bible(BibleItem::new(p, ctx)),
            ItemProps::Countdown(p) => PlaylistItem::Countdown(CountdownItem::new(p)),
            ItemProps::Media(p) => PlaylistItem::Media(MediaItem::new(p)),
            ItemProps::Pdf(p) => PlaylistItem::Pdf(PdfItem::new(p)),
            ItemProps::Template(p) => PlaylistItem::Template(TemplateItem::new(p)),
            ItemProps::Comment(p) => PlaylistItem::Comment(CommentItem::new(p)),
            ItemProps::RawCommand(p) => PlaylistItem::RawCommand(RawCommandItem::new(p)),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            PlaylistItem::Song(_) => ItemType::Song,
            PlaylistItem::Psalm(_) => ItemType::Psalm,
            PlaylistItem::Bible(_) => ItemType::Bible,
            PlaylistItem::Countdown(_) => ItemType::Countdown,
            PlaylistItem::Media(_) => ItemType::Media,
            PlaylistItem::Pdf(_) => ItemType::Pdf,
            PlaylistItem::Template(_) => ItemType::Template,
            PlaylistItem::Comment(_) => ItemType::Comment,
            PlaylistItem::RawCommand(_) => ItemType::RawCommand,
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            PlaylistItem::Song(i) => i.caption(),
            PlaylistItem::Psalm(i) => i.caption(),
            PlaylistItem::Bible(i) => &i.props.caption,
            PlaylistItem::Countdown(i) => &i.props.caption,
            PlaylistItem::Media(i) => &i.props.caption,
            PlaylistItem::Pdf(i) => &i.props.caption,
            PlaylistItem::Template(i) => &i.props.caption,
            PlaylistItem::Comment(i) => &i.props.caption,
            PlaylistItem::RawCommand(i) => &i.props.caption,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            PlaylistItem::Song(i) => &i.props.color,
            PlaylistItem::Psalm(i) => &i.props.color,
            PlaylistItem::Bible(i) => &i.props.color,
            PlaylistItem::Countdown(i) => &i.props.color,
            PlaylistItem::Media(i) => &i.props.color,
            PlaylistItem::Pdf(i) => &i.props.color,
            PlaylistItem::Template(i) => &i.props.color,
            PlaylistItem::Comment(i) => &i.props.color,
            PlaylistItem::RawCommand(i) => &i.props.color,
        }
    }

    /// Un item non affichable ne peut pas devenir l'item actif.
    pub fn displayable(&self) -> bool {
        match self {
            PlaylistItem::Song(i) => i.displayable(),
            PlaylistItem::Psalm(i) => i.displayable(),
            PlaylistItem::Bible(_) => true,
            PlaylistItem::Countdown(i) => i.displayable(),
            PlaylistItem::Media(_) => true,
            PlaylistItem::Pdf(i) => i.displayable(),
            PlaylistItem::Template(_) => true,
            PlaylistItem::Comment(_) => false,
            PlaylistItem::RawCommand(_) => true,
        }
    }

    pub fn slide_count(&self) -> usize {
        match self {
            PlaylistItem::Song(i) => i.slide_count(),
            PlaylistItem::Psalm(i) => i.slide_count(),
            PlaylistItem::Bible(_) => 1,
            PlaylistItem::Countdown(_) => 1,
            PlaylistItem::Media(_) => 1,
            PlaylistItem::Pdf(i) => i.slide_count(),
            PlaylistItem::Template(_) => 0,
            PlaylistItem::Comment(_) => 0,
            PlaylistItem::RawCommand(_) => 0,
        }
    }

    /// Slide actif, ou −1 pour un item non affichable.
    pub fn active_slide(&self) -> i64 {
        if !self.displayable() {
            return -1;
        }
        self.active_slide_raw() as i64
    }

    fn active_slide_raw(&self) -> usize {
        match self {
            PlaylistItem::Song(i) => i.active_slide,
            PlaylistItem::Psalm(i) => i.active_slide,
            PlaylistItem::Pdf(i) => i.active_slide,
            // Une seule slide ou slot virtuel unique.
            _ => 0,
        }
    }

    fn set_active_slide_raw(&mut self, slide: usize) {
        match self {
            PlaylistItem::Song(i) => i.active_slide = slide,
            PlaylistItem::Psalm(i) => i.active_slide = slide,
            PlaylistItem::Pdf(i) => i.active_slide = slide,
            // Le compte à rebours réarme son échéance à chaque activation.
            PlaylistItem::Countdown(i) => i.arm(),
            _ => {}
        }
    }

    /// Valide et résout le slide via la règle d'index partagée, puis
    /// l'applique. Retourne le slide résolu.
    pub fn set_active_slide(&mut self, slide: i64) -> Result<usize> {
        let count = self.slide_count();
        let resolved = if count == 0 {
            // Slot virtuel unique des items sans slide navigable.
            0
        } else {
            rgcutils::normalize_index(slide, count)
                .ok_or(PlaylistError::InvalidSlideIndex { slide, count })?
        };
        self.set_active_slide_raw(resolved);
        Ok(resolved)
    }

    /// Avance/recule d'un slide. Retourne 0 si le nouveau slide reste dans
    /// l'item, sinon `steps` inchangé : signal de débordement que la
    /// playlist convertit en navigation d'item.
    pub fn navigate_slide(&mut self, steps: i64) -> i64 {
        let count = self.slide_count();
        if count == 0 {
            return steps;
        }
        let next = self.active_slide_raw() as i64 + steps;
        if !(0..count as i64).contains(&next) {
            return steps;
        }
        self.set_active_slide_raw(next as usize);
        0
    }

    /// Produit l'instruction de rendu de l'item pour son slide actif.
    pub fn create_render_payload(&self) -> Result<RenderPayload> {
        match self {
            PlaylistItem::Song(i) => i.create_render_payload(),
            PlaylistItem::Psalm(i) => i.create_render_payload(),
            PlaylistItem::Bible(i) => Ok(i.create_render_payload()),
            PlaylistItem::Countdown(i) => Ok(i.create_render_payload()),
            PlaylistItem::Media(i) => Ok(i.create_render_payload()),
            PlaylistItem::Pdf(i) => i.create_render_payload(),
            PlaylistItem::Template(i) => Ok(i.create_render_payload()),
            PlaylistItem::Comment(_) => Err(PlaylistError::Content(
                "comment items produce no render payload".to_string(),
            )),
            PlaylistItem::RawCommand(i) => Ok(i.create_render_payload()),
        }
    }

    /// Signale à l'item qu'il n'est plus actif. Retourne les commandes de
    /// libération à transmettre aux renderers (vide pour la plupart des
    /// variantes).
    pub fn stop(&mut self) -> Vec<String> {
        match self {
            PlaylistItem::RawCommand(i) => i.stop(),
            _ => Vec::new(),
        }
    }

    /// Remplace les champs mutables de l'item, même type exigé.
    ///
    /// L'état d'affichage acquis (slide actif, pages déjà rasterisées)
    /// est préservé.
    pub fn update_from(&mut self, props: ItemProps, ctx: &ItemContext<'_>) -> Result<()> {
        let expected = self.item_type();
        let got = props.item_type();
        if expected != got {
            return Err(PlaylistError::TypeMismatch { expected, got });
        }

        match (self, props) {
            (PlaylistItem::Song(i), ItemProps::Song(p)) => i.update(p, ctx),
            (PlaylistItem::Psalm(i), ItemProps::Psalm(p)) => i.update(p, ctx),
            (PlaylistItem::Bible(i), ItemProps::Bible(p)) => i.update(p, ctx),
            (PlaylistItem::Countdown(i), ItemProps::Countdown(p)) => i.update(p),
            (PlaylistItem::Media(i), ItemProps::Media(p)) => i.update(p),
            (PlaylistItem::Pdf(i), ItemProps::Pdf(p)) => i.update(p),
            (PlaylistItem::Template(i), ItemProps::Template(p)) => i.update(p),
            (PlaylistItem::Comment(i), ItemProps::Comment(p)) => i.props = p,
            (PlaylistItem::RawCommand(i), ItemProps::RawCommand(p)) => i.props = p,
            _ => unreachable!("type equality checked above"),
        }
        Ok(())
    }

    /// Vue en lecture seule des propriétés.
    pub fn props(&self) -> ItemProps {
        match self {
            PlaylistItem::Song(i) => ItemProps::Song(i.props.clone()),
            PlaylistItem::Psalm(i) => ItemProps::Psalm(i.props.clone()),
            PlaylistItem::Bible(i) => ItemProps::Bible(i.props.clone()),
            PlaylistItem::Countdown(i) => ItemProps::Countdown(i.props.clone()),
            PlaylistItem::Media(i) => ItemProps::Media(i.props.clone()),
            PlaylistItem::Pdf(i) => ItemProps::Pdf(i.props.clone()),
            PlaylistItem::Template(i) => ItemProps::Template(i.props.clone()),
            PlaylistItem::Comment(i) => ItemProps::Comment(i.props.clone()),
            PlaylistItem::RawCommand(i) => ItemProps::RawCommand(i.props.clone()),
        }
    }

    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            caption: self.caption().to_string(),
            color: self.color().to_string(),
            item_type: self.item_type(),
            displayable: self.displayable(),
            slide_count: self.slide_count(),
        }
    }

    /// Pages rasterisées par le collaborateur externe (items Media/PDF).
    ///
    /// Retourne `false` pour les variantes sans rasterisation.
    pub fn add_rasterized_pages(&mut self, pages: usize) -> bool {
        match self {
            PlaylistItem::Pdf(i) => {
                i.add_pages(pages);
                true
            }
            _ => false,
        }
    }
}
