//! Static declarations of what a resource type needs, and what was resolved
//! for it in the current pass.

use crate::packs::pathresolver::PackMatches;
use crate::resources::resource::ResourceKind;
use crate::resources::resourcestore::ResourceHandle;
use std::path::{Path, PathBuf};

/// Dependencies and path ids declared by one resource.
///
/// Entries keep declaration order. Keys must be unique; duplicates are
/// reported when the resource is resolved, not when it is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    dependencies: Vec<(String, ResourceKind)>,
    paths: Vec<(String, String)>,
}

impl ResourceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that the resource registered as `dep_id` must exist and be a `kind`.
    pub fn depends_on(mut self, dep_id: impl Into<String>, kind: ResourceKind) -> Self {
        self.dependencies.push((dep_id.into(), kind));
        self
    }

    /// Declare a path id resolved through the active packs.
    pub fn with_path(mut self, file_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.paths.push((file_id.into(), pattern.into()));
        self
    }

    pub fn dependency_types(&self) -> &[(String, ResourceKind)] {
        &self.dependencies
    }

    pub fn paths(&self) -> &[(String, String)] {
        &self.paths
    }

    pub fn pattern(&self, file_id: &str) -> Option<&str> {
        self.paths
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, pattern)| pattern.as_str())
    }
}

/// Files matched for each path id, highest priority pack first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPaths {
    files: Vec<(String, PackMatches)>,
}

impl ResolvedPaths {
    pub(crate) fn push(&mut self, file_id: String, matches: PackMatches) {
        self.files.push((file_id, matches));
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.files.iter().any(|(id, _)| id == file_id)
    }

    /// All matches for `file_id`, highest priority first.
    pub fn get(&self, file_id: &str) -> &[PathBuf] {
        self.files
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, matches)| matches.as_slice())
            .unwrap_or(&[])
    }

    /// The single winning file for `file_id`.
    pub fn winner(&self, file_id: &str) -> Option<&Path> {
        self.get(file_id).first().map(PathBuf::as_path)
    }

    /// Matches for `file_id` lowest priority first, for merging.
    pub fn merge_order(&self, file_id: &str) -> impl Iterator<Item = &Path> {
        self.get(file_id).iter().rev().map(PathBuf::as_path)
    }

    /// Path ids with their matches, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.files
            .iter()
            .map(|(id, matches)| (id.as_str(), matches.as_slice()))
    }
}

/// Non-owning reference to another registered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    id: String,
    handle: ResourceHandle,
    kind: ResourceKind,
}

impl ResourceRef {
    pub(crate) fn new(id: impl Into<String>, handle: ResourceHandle, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            handle,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Dependencies resolved for one resource, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    refs: Vec<(String, ResourceRef)>,
}

impl ResolvedDependencies {
    pub(crate) fn insert(&mut self, dep_id: String, reference: ResourceRef) {
        self.refs.push((dep_id, reference));
    }

    pub fn get(&self, dep_id: &str) -> Option<&ResourceRef> {
        self.refs
            .iter()
            .find(|(id, _)| id == dep_id)
            .map(|(_, reference)| reference)
    }

    pub fn contains(&self, dep_id: &str) -> bool {
        self.get(dep_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRef> {
        self.refs.iter().map(|(_, reference)| reference)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    const COLORS: ResourceKind = ResourceKind::new("colors");

    #[test]
    fn test_descriptor_keeps_declaration_order() {
        let d = ResourceDescriptor::new()
            .depends_on("palette", COLORS)
            .with_path("atlas", "fonts/main.png")
            .with_path("metrics", "fonts/main.json");
        assert_eq!(d.dependency_types(), &[("palette".to_string(), COLORS)]);
        assert_eq!(d.paths()[1].0, "metrics");
        assert_eq!(d.pattern("atlas"), Some("fonts/main.png"));
        assert_eq!(d.pattern("missing"), None);
    }

    #[test]
    fn test_default_descriptor_is_empty() {
        let d = ResourceDescriptor::default();
        assert!(d.dependency_types().is_empty());
        assert!(d.paths().is_empty());
    }

    #[test]
    fn test_resolved_paths_winner_and_merge_order() {
        let mut paths = ResolvedPaths::default();
        paths.push(
            "table".to_string(),
            smallvec![PathBuf::from("/over/colors.json"), PathBuf::from("/base/colors.json")],
        );
        assert_eq!(paths.winner("table"), Some(Path::new("/over/colors.json")));
        let merged: Vec<&Path> = paths.merge_order("table").collect();
        assert_eq!(
            merged,
            vec![Path::new("/base/colors.json"), Path::new("/over/colors.json")]
        );
        assert!(paths.get("other").is_empty());
        assert!(paths.winner("other").is_none());
    }
}
