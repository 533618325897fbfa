//! # RegieCast Configuration Module
//!
//! This module provides configuration management for RegieCast, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use rgcconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! let targets = config.get_renderer_targets()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("regiecast.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load RegieCast configuration"));
}

const ENV_CONFIG_DIR: &str = "REGIECAST_CONFIG";
const ENV_PREFIX: &str = "REGIECAST_CONFIG__";

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_TRANSITION_FRAMES: u32 = 12;
const DEFAULT_CITATION_STYLE: &str = "1, 2-3.4; 5, 6";
const DEFAULT_LANGUAGE: &str = "de";

/// Paramètres d'un moteur de rendu distant (un canal CasparCG).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RendererSettings {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub channel: u16,
    pub layer_background: u16,
    pub layer_foreground: u16,
}

/// Configuration manager for RegieCast
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".regiecast").exists() {
            return ".regiecast".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".regiecast");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".regiecast".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `REGIECAST_CONFIG` environment variable
    /// 3. `.regiecast` in the current directory
    /// 4. `.regiecast` in the user's home directory
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        new_map.insert(new_key, Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Résout un chemin relatif ou absolu et crée le répertoire si nécessaire
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            // Chemin relatif : le résoudre par rapport à config_dir
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created content directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    // ======================= Getters / Setters ==========================

    /// Port HTTP du serveur de contrôle.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => n.as_u64().map(|v| v as u16).unwrap_or(DEFAULT_HTTP_PORT),
            _ => DEFAULT_HTTP_PORT,
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(port.into()))
    }

    /// Liste des moteurs de rendu configurés.
    ///
    /// Une liste vide est valide (mode répétition sans sortie graphique).
    pub fn get_renderer_targets(&self) -> Result<Vec<RendererSettings>> {
        match self.get_value(&["renderers"]) {
            Ok(value @ Value::Sequence(_)) => {
                serde_yaml::from_value(value).map_err(|e| anyhow!("Invalid renderers entry: {}", e))
            }
            Ok(Value::Null) | Err(_) => Ok(Vec::new()),
            Ok(other) => Err(anyhow!("renderers must be a sequence, got {:?}", other)),
        }
    }

    /// Nombre de frames de la transition MIX des médias.
    pub fn get_transition_frames(&self) -> u32 {
        match self.get_value(&["render", "transition_frames"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .map(|v| v as u32)
                .unwrap_or(DEFAULT_TRANSITION_FRAMES),
            _ => DEFAULT_TRANSITION_FRAMES,
        }
    }

    /// Gabarit de style de citation biblique (chaîne à ancres `1..6`).
    pub fn get_citation_style(&self) -> String {
        match self.get_value(&["bible", "citation_style"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_CITATION_STYLE.to_string(),
        }
    }

    pub fn set_citation_style(&self, style: &str) -> Result<()> {
        self.set_value(
            &["bible", "citation_style"],
            Value::String(style.to_string()),
        )
    }

    /// Langue par défaut des chants (ordre des langues affichées).
    pub fn get_default_song_language(&self) -> String {
        match self.get_value(&["content", "default_language"]) {
            Ok(Value::String(s)) => s,
            _ => DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Répertoire des fichiers de chants (créé si absent).
    pub fn get_song_dir(&self) -> Result<String> {
        match self.get_value(&["content", "song_dir"]) {
            Ok(Value::String(s)) => self.resolve_and_create_dir(&s),
            _ => self.resolve_and_create_dir("songs"),
        }
    }

    /// Répertoire des fichiers de psaumes (créé si absent).
    pub fn get_psalm_dir(&self) -> Result<String> {
        match self.get_value(&["content", "psalm_dir"]) {
            Ok(Value::String(s)) => self.resolve_and_create_dir(&s),
            _ => self.resolve_and_create_dir("psalms"),
        }
    }

    /// Niveau de log minimal configuré (fallback de `RUST_LOG`).
    pub fn get_log_min_level(&self) -> String {
        match self.get_value(&["log", "min_level"]) {
            Ok(Value::String(s)) => s,
            _ => "INFO".to_string(),
        }
    }
}

/// Merge deux valeurs YAML (les mappings sont fusionnés récursivement,
/// tout le reste est remplacé par la valeur externe).
fn merge_yaml(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Mapping(base_map), Value::Mapping(other_map)) => {
            for (key, other_value) in other_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_yaml(base_value, other_value),
                    None => {
                        base_map.insert(key.clone(), other_value.clone());
                    }
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

/// Retourne la configuration globale (chargée au premier accès).
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}
