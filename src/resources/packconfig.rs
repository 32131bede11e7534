//! Pack configuration.
//!
//! Settings read from an INI file: where packs are searched, the engine's
//! pack version, the default pack and the packs to enable on top of it.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! current_version = 1
//!
//! [packs]
//! search_paths = resources,packs
//! default = Default
//! enabled = Default,HighContrast
//! ```

use crate::packs::packregistry::{CURRENT_VERSION, DEFAULT_PACK_NAME};
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_SEARCH_PATH: &str = "resources";
const DEFAULT_CONFIG_PATH: &str = "./packs.ini";
// `;` starts a comment for configparser, so lists use commas.
const LIST_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Pack schema version understood by the engine.
    pub current_version: i64,
    /// Directories scanned for packs, in order.
    pub search_paths: Vec<PathBuf>,
    /// Pack activated first when it is not listed in `enabled`.
    pub default_pack: String,
    /// Packs to activate, lowest priority first.
    pub enabled: Vec<String>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PackConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            current_version: CURRENT_VERSION,
            search_paths: vec![PathBuf::from(DEFAULT_SEARCH_PATH)],
            default_pack: DEFAULT_PACK_NAME.to_string(),
            enabled: Vec::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [engine] section
        if let Some(version) = config.getint("engine", "current_version").ok().flatten() {
            self.current_version = version;
        }

        // [packs] section
        if let Some(paths) = config.get("packs", "search_paths") {
            let paths = split_list(&paths, LIST_SEPARATOR);
            if !paths.is_empty() {
                self.search_paths = paths.into_iter().map(PathBuf::from).collect();
            }
        }
        if let Some(default) = config.get("packs", "default") {
            let default = default.trim();
            if !default.is_empty() {
                self.default_pack = default.to_string();
            }
        }
        if let Some(enabled) = config.get("packs", "enabled") {
            self.enabled = split_list(&enabled, LIST_SEPARATOR);
        }

        info!(
            "Loaded pack config: version={}, search_paths={:?}, default={}, enabled={:?}",
            self.current_version, self.search_paths, self.default_pack, self.enabled
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [engine] section
        config.set("engine", "current_version", Some(self.current_version.to_string()));

        // [packs] section
        let search_paths: Vec<String> = self
            .search_paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        config.set(
            "packs",
            "search_paths",
            Some(search_paths.join(&LIST_SEPARATOR.to_string())),
        );
        config.set("packs", "default", Some(self.default_pack.clone()));
        config.set(
            "packs",
            "enabled",
            Some(self.enabled.join(&LIST_SEPARATOR.to_string())),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved pack config to {:?}", self.config_path);

        Ok(())
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let c = PackConfig::new();
        assert_eq!(c.current_version, CURRENT_VERSION);
        assert_eq!(c.search_paths, vec![PathBuf::from("resources")]);
        assert_eq!(c.default_pack, "Default");
        assert!(c.enabled.is_empty());
    }

    #[test]
    fn test_split_list_trims_and_skips_empty() {
        assert_eq!(split_list(" a, b ,,c ", ','), vec!["a", "b", "c"]);
        assert!(split_list("", ',').is_empty());
    }

    #[test]
    fn test_load_from_file_reads_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packs.ini");
        fs::write(
            &path,
            "[engine]\ncurrent_version = 3\n\n[packs]\nsearch_paths = base, user\ndefault = Core\nenabled = Core, Retro\n",
        )
        .unwrap();

        let mut c = PackConfig::with_path(&path);
        c.load_from_file().unwrap();
        assert_eq!(c.current_version, 3);
        assert_eq!(c.search_paths, vec![PathBuf::from("base"), PathBuf::from("user")]);
        assert_eq!(c.default_pack, "Core");
        assert_eq!(c.enabled, vec!["Core", "Retro"]);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packs.ini");
        fs::write(&path, "[packs]\nenabled = Retro\n").unwrap();
        let mut c = PackConfig::with_path(&path);
        c.load_from_file().unwrap();
        assert_eq!(c.current_version, CURRENT_VERSION);
        assert_eq!(c.default_pack, "Default");
        assert_eq!(c.enabled, vec!["Retro"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut c = PackConfig::with_path("/definitely/not/here/packs.ini");
        assert!(c.load_from_file().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packs.ini");
        let mut saved = PackConfig::with_path(&path);
        saved.current_version = 4;
        saved.search_paths = vec![PathBuf::from("base"), PathBuf::from("user/packs")];
        saved.enabled = vec!["A".to_string(), "B".to_string()];
        saved.save_to_file().unwrap();

        let mut loaded = PackConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, saved);
    }
}
