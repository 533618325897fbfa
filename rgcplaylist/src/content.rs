//! Fournisseurs de contenu déjà parsé (chants, psaumes).
//!
//! Le moteur ne lit jamais les fichiers lui-même : il consomme les
//! structures produites par un collaborateur (voir l'implémentation
//! filesystem dans le binaire). Un échec de chargement rend l'item
//! non affichable sans bloquer le reste de la playlist.

use serde::{Deserialize, Serialize};

/// Un groupe de lignes affiché d'un bloc (une slide de chant).
///
/// Chaque ligne porte le texte de toutes les langues du fichier, dans
/// l'ordre des langues déclaré par [`SongData::languages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSlide {
    pub lines: Vec<Vec<String>>,
}

/// Une partie nommée d'un chant (couplet, refrain, pont...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPart {
    pub name: String,
    pub slides: Vec<SongSlide>,
}

/// Un chant parsé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongData {
    pub title: String,
    pub parts: Vec<SongPart>,
    /// Ordre des parties par défaut du fichier.
    pub verse_order: Vec<String>,
    /// Langues disponibles, dans l'ordre du fichier.
    pub languages: Vec<String>,
}

/// Une slide de psaume (texte + indication de strophe éventuelle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsalmSlide {
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Un psaume parsé.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsalmData {
    pub caption: String,
    pub slides: Vec<PsalmSlide>,
}

/// Accès aux chants par référence de fichier.
pub trait SongLibrary: Send + Sync {
    fn load_song(&self, file: &str) -> anyhow::Result<SongData>;
}

/// Accès aux psaumes par référence de fichier.
pub trait PsalmLibrary: Send + Sync {
    fn load_psalm(&self, file: &str) -> anyhow::Result<PsalmData>;
}

/// Bibliothèques vides : tout chargement échoue. Utilisées dans les tests
/// et quand aucun répertoire de contenu n'est configuré.
#[derive(Debug, Default)]
pub struct EmptyLibrary;

impl SongLibrary for EmptyLibrary {
    fn load_song(&self, file: &str) -> anyhow::Result<SongData> {
        Err(anyhow::anyhow!("No song library configured (file `{}`)", file))
    }
}

impl PsalmLibrary for EmptyLibrary {
    fn load_psalm(&self, file: &str) -> anyhow::Result<PsalmData> {
        Err(anyhow::anyhow!(
            "No psalm library configured (file `{}`)",
            file
        ))
    }
}
