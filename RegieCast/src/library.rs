//! Bibliothèques de contenu filesystem.
//!
//! Fins wrappers d'E/S : les fichiers sont déjà au format structuré
//! (JSON), le moteur ne voit que les structures parsées.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use rgcplaylist::{PsalmData, PsalmLibrary, SongData, SongLibrary};

fn resolve(dir: &Path, file: &str) -> Result<PathBuf> {
    // Les références de fichier restent confinées au répertoire configuré.
    if file.contains("..") || file.starts_with('/') {
        return Err(anyhow!("Invalid content file reference `{}`", file));
    }
    Ok(dir.join(file))
}

pub struct FsSongLibrary {
    dir: PathBuf,
}

impl FsSongLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SongLibrary for FsSongLibrary {
    fn load_song(&self, file: &str) -> Result<SongData> {
        let path = resolve(&self.dir, file)?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read song file {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid song file {:?}", path))
    }
}

pub struct FsPsalmLibrary {
    dir: PathBuf,
}

impl FsPsalmLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PsalmLibrary for FsPsalmLibrary {
    fn load_psalm(&self, file: &str) -> Result<PsalmData> {
        let path = resolve(&self.dir, file)?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read psalm file {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid psalm file {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("regiecast-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_song_roundtrip() {
        let dir = temp_dir("songs");
        let json = serde_json::json!({
            "title": "Lobe den Herren",
            "parts": [
                {"name": "verse 1", "slides": [{"lines": [["Lobe den Herren"]]}]}
            ],
            "verse_order": ["verse 1"],
            "languages": ["de"],
        });
        std::fs::write(dir.join("lobe.json"), json.to_string()).unwrap();

        let library = FsSongLibrary::new(&dir);
        let song = library.load_song("lobe.json").unwrap();
        assert_eq!(song.title, "Lobe den Herren");
        assert_eq!(song.parts.len(), 1);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let library = FsSongLibrary::new("/srv/songs");
        assert!(library.load_song("../etc/passwd").is_err());
        assert!(library.load_song("/etc/passwd").is_err());
    }

    #[test]
    fn test_missing_psalm_is_an_error_not_a_panic() {
        let dir = temp_dir("psalms");
        let library = FsPsalmLibrary::new(&dir);
        assert!(library.load_psalm("does-not-exist.json").is_err());
    }
}
