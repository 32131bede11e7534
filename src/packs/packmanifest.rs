//! Pack manifest descriptor.
//!
//! Every pack is a directory directly below one of the search paths. The
//! directory name is the pack id and the directory must contain a
//! `metadata.json` manifest:
//!
//! ```json
//! { "description": "Default resources", "version": 1, "major": false }
//! ```
//!
//! `description` and `major` may be omitted; `version` is required.

use crate::error::{ResourceError, ResourceResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the manifest inside a pack directory.
pub const MANIFEST_FILE_NAME: &str = "metadata.json";

/// Immutable description of one pack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackManifest {
    /// Pack id, taken from the pack directory name.
    #[serde(skip)]
    pub id: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Schema version the pack was authored against.
    pub version: i64,
    /// Major packs must match the engine version exactly.
    #[serde(default)]
    pub major: bool,
}

impl PackManifest {
    pub fn new(id: impl Into<String>, description: impl Into<String>, version: i64, major: bool) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            version,
            major,
        }
    }

    /// Parse a manifest body for the pack `id`.
    pub fn from_json(id: impl Into<String>, json: &str) -> Result<Self, serde_json::Error> {
        let mut manifest: PackManifest = serde_json::from_str(json)?;
        manifest.id = id.into();
        Ok(manifest)
    }
}

/// A manifest discovered on disk, bound to the directory it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailablePack {
    pub manifest: PackManifest,
    pub root: PathBuf,
}

impl AvailablePack {
    pub fn new(manifest: PackManifest, root: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            root: root.into(),
        }
    }

    /// Read the pack living in `dir`.
    ///
    /// Returns `Ok(None)` when the directory has no manifest, which means it
    /// is not a pack at all.
    pub fn read(dir: &Path) -> ResourceResult<Option<Self>> {
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        if !manifest_path.is_file() {
            return Ok(None);
        }
        let Some(id) = dir.file_name().map(|name| name.to_string_lossy().into_owned()) else {
            return Ok(None);
        };
        let body = fs::read_to_string(&manifest_path)?;
        let manifest = PackManifest::from_json(id, &body).map_err(|e| ResourceError::Manifest {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(Self::new(manifest, dir)))
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let m = PackManifest::from_json("Default", r#"{ "version": 3 }"#).unwrap();
        assert_eq!(m.id, "Default");
        assert_eq!(m.version, 3);
        assert_eq!(m.description, "");
        assert!(!m.major);
    }

    #[test]
    fn test_from_json_reads_all_fields() {
        let m = PackManifest::from_json(
            "Hd",
            r#"{ "description": "Crisp fonts", "version": 2, "major": true }"#,
        )
        .unwrap();
        assert_eq!(m, PackManifest::new("Hd", "Crisp fonts", 2, true));
    }

    #[test]
    fn test_from_json_requires_version() {
        assert!(PackManifest::from_json("x", r#"{ "description": "no version" }"#).is_err());
    }

    #[test]
    fn test_read_skips_directory_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AvailablePack::read(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_uses_directory_name_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let pack_dir = dir.path().join("Retro");
        fs::create_dir(&pack_dir).unwrap();
        fs::write(pack_dir.join(MANIFEST_FILE_NAME), r#"{ "version": 1 }"#).unwrap();

        let pack = AvailablePack::read(&pack_dir).unwrap().unwrap();
        assert_eq!(pack.id(), "Retro");
        assert_eq!(pack.root, pack_dir);
    }

    #[test]
    fn test_read_reports_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ not json").unwrap();
        let err = AvailablePack::read(dir.path()).unwrap_err();
        assert!(matches!(err, ResourceError::Manifest { .. }));
    }
}
