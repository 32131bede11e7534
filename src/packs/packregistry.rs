//! Ordered collection of active packs.
//!
//! Packs are discovered by scanning the search paths for directories holding
//! a [`MANIFEST_FILE_NAME`](super::packmanifest::MANIFEST_FILE_NAME) file and
//! become active through [`PackRegistry::try_add_pack`]. Registration order is
//! override priority: the pack added last wins single-file lookups.

use crate::error::{ResourceError, ResourceResult};
use crate::packs::packmanifest::{AvailablePack, PackManifest};
use crate::packs::pathresolver::PathResolver;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Pack loaded when no other pack list is given.
pub const DEFAULT_PACK_NAME: &str = "Default";
/// Pack schema version understood by this engine.
pub const CURRENT_VERSION: i64 = 1;

/// A manifest bound to its root directory while it is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPack {
    pub manifest: PackManifest,
    pub root: PathBuf,
    /// Assigned in registration order, never reused.
    pub priority: u64,
}

impl LoadedPack {
    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}

#[derive(Debug, Clone)]
pub struct PackRegistry {
    search_paths: Vec<PathBuf>,
    loaded: Vec<LoadedPack>,
    current_version: i64,
    default_pack_name: String,
    next_priority: u64,
}

impl Default for PackRegistry {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl PackRegistry {
    /// Create a registry scanning the given search paths, in order.
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            loaded: Vec::new(),
            current_version: CURRENT_VERSION,
            default_pack_name: DEFAULT_PACK_NAME.to_string(),
            next_priority: 0,
        }
    }

    pub fn with_current_version(mut self, version: i64) -> Self {
        self.current_version = version;
        self
    }

    pub fn with_default_pack_name(mut self, name: impl Into<String>) -> Self {
        self.default_pack_name = name.into();
        self
    }

    pub fn current_version(&self) -> i64 {
        self.current_version
    }

    pub fn default_pack_name(&self) -> &str {
        &self.default_pack_name
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Active packs, lowest priority first.
    pub fn loaded_packs(&self) -> &[LoadedPack] {
        &self.loaded
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.iter().any(|p| p.id() == id)
    }

    /// Enumerate every pack found under the search paths.
    ///
    /// The sequence is lazy and holds no state; calling this again rescans
    /// the disk. Directories are visited per search path in name order.
    pub fn available_packs(&self) -> impl Iterator<Item = AvailablePack> + '_ {
        self.search_paths.iter().flat_map(|root| scan_search_path(root))
    }

    /// Same as [`available_packs`](Self::available_packs), minus the packs
    /// already active.
    pub fn unloaded_available_packs(&self) -> impl Iterator<Item = AvailablePack> + '_ {
        self.available_packs().filter(|pack| !self.is_loaded(pack.id()))
    }

    /// Find an available pack by id. The first search path holding it wins.
    pub fn find_available(&self, name: &str) -> Option<AvailablePack> {
        self.available_packs().find(|pack| pack.id() == name)
    }

    /// Activate a pack on top of the current ones.
    ///
    /// Fails without touching the registry if the id is already active or if
    /// a major pack does not match [`current_version`](Self::current_version).
    pub fn try_add_pack(&mut self, pack: AvailablePack) -> ResourceResult<()> {
        let AvailablePack { manifest, root } = pack;
        if self.is_loaded(&manifest.id) {
            warn!(target: "packs", "Pack '{}' is already loaded", manifest.id);
            return Err(ResourceError::DuplicatePackId(manifest.id));
        }
        if manifest.version != self.current_version {
            if manifest.major {
                warn!(
                    target: "packs",
                    "Rejecting major pack '{}': version {} does not match engine version {}",
                    manifest.id, manifest.version, self.current_version
                );
                return Err(ResourceError::PackVersionIncompatible {
                    id: manifest.id,
                    version: manifest.version,
                    expected: self.current_version,
                });
            }
            warn!(
                target: "packs",
                "Pack '{}' targets version {} (engine is {}), some resources may not match",
                manifest.id, manifest.version, self.current_version
            );
        }

        let priority = self.next_priority;
        self.next_priority += 1;
        info!(target: "packs", "Added pack '{}' from {:?} (priority {})", manifest.id, root, priority);
        self.loaded.push(LoadedPack {
            manifest,
            root,
            priority,
        });
        Ok(())
    }

    /// Activate packs by id, in the given order.
    ///
    /// Later names override earlier ones. Each add is independent: a failure
    /// does not roll back packs already added, and the remaining names are
    /// still tried. The error lists every name that could not be added.
    pub fn try_add_packs_by_names<I, S>(&mut self, names: I) -> ResourceResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = Vec::new();
        for name in names {
            let name = name.as_ref();
            let result = match self.find_available(name) {
                Some(pack) => self.try_add_pack(pack),
                None => Err(ResourceError::PackNotFound(name.to_string())),
            };
            if let Err(e) = result {
                warn!(target: "packs", "Could not add pack '{}': {}", name, e);
                rejected.push(name.to_string());
            }
        }
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(ResourceError::PacksRejected(rejected))
        }
    }

    /// Deactivate a pack. Returns the removed pack, if it was active.
    pub fn try_remove_pack(&mut self, id: &str) -> Option<LoadedPack> {
        let index = self.loaded.iter().position(|p| p.id() == id)?;
        let removed = self.loaded.remove(index);
        info!(target: "packs", "Removed pack '{}'", id);
        Some(removed)
    }

    pub fn remove_all_packs(&mut self) {
        if !self.loaded.is_empty() {
            info!(target: "packs", "Removing all {} packs", self.loaded.len());
        }
        self.loaded.clear();
    }

    /// Path lookups over the active packs.
    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.loaded)
    }
}

fn scan_search_path(root: &Path) -> impl Iterator<Item = AvailablePack> {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(e) => {
            debug!(target: "packs", "Skipping search path {:?}: {}", root, e);
            Vec::new()
        }
    };
    dirs.sort();
    dirs.into_iter().filter_map(|dir| match AvailablePack::read(&dir) {
        Ok(pack) => pack,
        Err(e) => {
            warn!(target: "packs", "Ignoring pack directory {:?}: {}", dir, e);
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packs::packmanifest::MANIFEST_FILE_NAME;

    fn write_pack(root: &Path, id: &str, manifest: &str) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE_NAME), manifest).unwrap();
        dir
    }

    fn ids(registry: &PackRegistry) -> Vec<String> {
        registry.loaded_packs().iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn test_available_packs_scans_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(dir.path(), "b", r#"{ "version": 1 }"#);
        write_pack(dir.path(), "a", r#"{ "version": 1 }"#);
        fs::create_dir(dir.path().join("not_a_pack")).unwrap();

        let registry = PackRegistry::new([dir.path()]);
        let found: Vec<String> = registry.available_packs().map(|p| p.id().to_string()).collect();
        assert_eq!(found, vec!["a", "b"]);
        // Restartable
        assert_eq!(registry.available_packs().count(), 2);
    }

    #[test]
    fn test_available_packs_skips_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(dir.path(), "good", r#"{ "version": 1 }"#);
        write_pack(dir.path(), "broken", "{");
        let registry = PackRegistry::new([dir.path()]);
        let found: Vec<String> = registry.available_packs().map(|p| p.id().to_string()).collect();
        assert_eq!(found, vec!["good"]);
    }

    #[test]
    fn test_missing_search_path_yields_nothing() {
        let registry = PackRegistry::new(["/definitely/not/here"]);
        assert_eq!(registry.available_packs().count(), 0);
    }

    #[test]
    fn test_duplicate_pack_is_rejected() {
        let mut registry = PackRegistry::default();
        let pack = AvailablePack::new(PackManifest::new("a", "", 1, false), "/a");
        registry.try_add_pack(pack.clone()).unwrap();
        let err = registry.try_add_pack(pack).unwrap_err();
        assert!(matches!(err, ResourceError::DuplicatePackId(id) if id == "a"));
        assert_eq!(ids(&registry), vec!["a"]);
    }

    #[test]
    fn test_major_pack_with_other_version_is_rejected() {
        let mut registry = PackRegistry::default().with_current_version(2);
        let pack = AvailablePack::new(PackManifest::new("old", "", 1, true), "/old");
        let err = registry.try_add_pack(pack).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::PackVersionIncompatible { version: 1, expected: 2, .. }
        ));
        assert!(registry.loaded_packs().is_empty());
    }

    #[test]
    fn test_minor_pack_with_other_version_is_accepted() {
        let mut registry = PackRegistry::default().with_current_version(2);
        let pack = AvailablePack::new(PackManifest::new("old", "", 1, false), "/old");
        registry.try_add_pack(pack).unwrap();
        assert_eq!(ids(&registry), vec!["old"]);
    }

    #[test]
    fn test_priorities_are_monotonic() {
        let mut registry = PackRegistry::default();
        for id in ["a", "b", "c"] {
            let pack = AvailablePack::new(PackManifest::new(id, "", 1, false), id);
            registry.try_add_pack(pack).unwrap();
        }
        registry.try_remove_pack("b").unwrap();
        let pack = AvailablePack::new(PackManifest::new("b", "", 1, false), "b");
        registry.try_add_pack(pack).unwrap();
        let priorities: Vec<u64> = registry.loaded_packs().iter().map(|p| p.priority).collect();
        assert_eq!(priorities, vec![0, 2, 3]);
    }

    #[test]
    fn test_add_by_names_keeps_going_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(dir.path(), "Base", r#"{ "version": 1 }"#);
        write_pack(dir.path(), "Future", r#"{ "version": 9, "major": true }"#);
        write_pack(dir.path(), "Override", r#"{ "version": 1 }"#);

        let mut registry = PackRegistry::new([dir.path()]);
        let err = registry
            .try_add_packs_by_names(["Base", "Missing", "Future", "Override"])
            .unwrap_err();
        match err {
            ResourceError::PacksRejected(names) => assert_eq!(names, vec!["Missing", "Future"]),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(ids(&registry), vec!["Base", "Override"]);
    }

    #[test]
    fn test_unloaded_available_packs_filters_loaded() {
        let dir = tempfile::tempdir().unwrap();
        write_pack(dir.path(), "a", r#"{ "version": 1 }"#);
        write_pack(dir.path(), "b", r#"{ "version": 1 }"#);
        let mut registry = PackRegistry::new([dir.path()]);
        registry.try_add_packs_by_names(["a"]).unwrap();
        let rest: Vec<String> = registry
            .unloaded_available_packs()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(rest, vec!["b"]);
    }

    #[test]
    fn test_remove_unknown_pack_is_none() {
        let mut registry = PackRegistry::default();
        assert!(registry.try_remove_pack("nope").is_none());
    }

    #[test]
    fn test_remove_all_packs() {
        let mut registry = PackRegistry::default();
        let pack = AvailablePack::new(PackManifest::new("a", "", 1, false), "/a");
        registry.try_add_pack(pack).unwrap();
        registry.remove_all_packs();
        assert!(registry.loaded_packs().is_empty());
    }
}
