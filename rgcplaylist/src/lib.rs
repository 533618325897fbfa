//! # rgcplaylist - Moteur de playlist de RegieCast
//!
//! Cette crate fournit le cœur de la régie :
//! - Items polymorphes (chant, psaume, lecture biblique, compte à rebours,
//!   média, PDF, gabarit, commentaire, commandes brutes)
//! - Machine à états de navigation et de mutation avec bouclage et saut
//!   des items non affichables
//! - Snapshot canonique diffusé aux clients de contrôle
//! - Formatage des citations bibliques
//!
//! # Architecture
//!
//! - **Playlist** : collection ordonnée + pointeur actif, seul chemin de
//!   mutation
//! - **PlaylistItem** : type somme, une variante par type de contenu
//! - **RenderSink** : seam vers la couche de synchronisation des renderers
//!   (implémentée par `rgccontrol`)
//! - **SongLibrary / PsalmLibrary** : fournisseurs de contenu déjà parsé

pub mod citation;
pub mod content;
mod error;
pub mod item;
pub mod payload;
mod playlist;
pub mod sink;
pub mod snapshot;

// Réexports publics
pub use citation::{ChapterVerses, CitationStyle};
pub use content::{PsalmData, PsalmLibrary, PsalmSlide, SongData, SongLibrary, SongPart, SongSlide};
pub use error::{PlaylistError, Result};
pub use item::{ItemContext, ItemProps, ItemType, PlaylistItem};
pub use payload::RenderPayload;
pub use playlist::Playlist;
pub use sink::{NullRenderSink, RenderSink};
pub use snapshot::{ActiveItemSlide, ClientSnapshot, ItemSummary};
