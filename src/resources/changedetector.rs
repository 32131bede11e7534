//! Fingerprints of the files backing each resource.
//!
//! A soft reload only touches resources whose fingerprint moved. The
//! fingerprint folds every resolved path id and absolute path, in resolved
//! order, into a 64-bit [`FxHasher`] value: it is stable across calls and
//! processes for the same pack state, and changes when a matching file is
//! added, removed or reordered.

use crate::error::{ResourceError, ResourceResult};
use crate::packs::pathresolver::{PackMatches, PathResolver};
use crate::resources::descriptor::{ResolvedPaths, ResourceDescriptor};
use crate::resources::resourcestore::{ResourceHandle, ResourceStore};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Resolve every path id declared by `descriptor` through the active packs.
pub fn resolve_paths(
    id: &str,
    descriptor: &ResourceDescriptor,
    resolver: PathResolver<'_>,
) -> ResourceResult<ResolvedPaths> {
    let mut resolved = ResolvedPaths::default();
    for (file_id, pattern) in descriptor.paths() {
        if resolved.contains(file_id) {
            return Err(ResourceError::DuplicatePathId {
                resource: id.to_string(),
                file: file_id.clone(),
            });
        }
        let matches: PackMatches = resolver.get_all_paths(pattern).collect();
        resolved.push(file_id.clone(), matches);
    }
    Ok(resolved)
}

/// Fingerprint of a resolved path set.
pub fn paths_hash(paths: &ResolvedPaths) -> u64 {
    let mut hasher = FxHasher::default();
    for (file_id, matches) in paths.iter() {
        file_id.hash(&mut hasher);
        matches.len().hash(&mut hasher);
        for path in matches {
            path.hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Freshly resolved paths for one resource, compared with its last load.
#[derive(Debug, Clone)]
pub struct PathRefresh {
    pub handle: ResourceHandle,
    pub paths: ResolvedPaths,
    pub fingerprint: u64,
    /// The fingerprint differs from the one recorded at the last successful
    /// load, or the resource was never loaded.
    pub changed: bool,
}

/// Re-resolve the paths of every registered resource, in handle order.
pub fn refresh_paths(
    store: &ResourceStore,
    resolver: PathResolver<'_>,
) -> ResourceResult<Vec<PathRefresh>> {
    store
        .handles()
        .map(|handle| {
            let entry = store.entry(handle);
            let paths = resolve_paths(&entry.id, &entry.descriptor, resolver)?;
            let fingerprint = paths_hash(&paths);
            Ok(PathRefresh {
                handle,
                changed: entry.fingerprint != Some(fingerprint),
                paths,
                fingerprint,
            })
        })
        .collect()
}
