//! Overlay path lookups across the active packs.
//!
//! A relative path is checked against every active pack root, highest
//! priority (last added) first. Two consumption styles exist:
//!
//! - single winner: [`PathResolver::try_get_path`] takes the first match;
//! - accumulate and override: [`PathResolver::merge_order`] lists every match
//!   lowest priority first, so later entries overwrite earlier ones.
//!
//! The last path segment may contain `*` and `?` wildcards. Matches inside
//! one pack are returned in file name order.

use crate::packs::packregistry::LoadedPack;
use log::warn;
use smallvec::SmallVec;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Matches found inside a single pack.
pub type PackMatches = SmallVec<[PathBuf; 1]>;

#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    packs: &'a [LoadedPack],
}

impl<'a> PathResolver<'a> {
    /// `packs` must be ordered lowest priority first.
    pub fn new(packs: &'a [LoadedPack]) -> Self {
        Self { packs }
    }

    /// Every existing match for `relative`, highest priority pack first.
    ///
    /// The sequence is lazy; the disk is only touched as it is consumed.
    pub fn get_all_paths(self, relative: &str) -> impl Iterator<Item = PathBuf> + use<'a> {
        let pattern = RelativePattern::parse(relative);
        self.packs.iter().rev().flat_map(move |pack| {
            pattern
                .as_ref()
                .map(|p| p.matches_in(&pack.root))
                .unwrap_or_default()
        })
    }

    /// The winning match for `relative`, if any pack provides it.
    pub fn try_get_path(self, relative: &str) -> Option<PathBuf> {
        self.get_all_paths(relative).next()
    }

    /// Every match for `relative`, lowest priority pack first.
    pub fn merge_order(self, relative: &str) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.get_all_paths(relative).collect();
        paths.reverse();
        paths
    }
}

#[derive(Debug, Clone)]
struct RelativePattern {
    dir: PathBuf,
    file: String,
    wildcard: bool,
}

impl RelativePattern {
    fn parse(relative: &str) -> Option<Self> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            warn!(target: "packs", "Refusing to resolve unsafe relative path '{}'", relative);
            return None;
        }
        let file = path.file_name()?.to_string_lossy().into_owned();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let wildcard = file.contains(['*', '?']);
        Some(Self {
            dir,
            file,
            wildcard,
        })
    }

    fn matches_in(&self, root: &Path) -> PackMatches {
        let dir = root.join(&self.dir);
        if !self.wildcard {
            let candidate = dir.join(&self.file);
            return if candidate.is_file() {
                smallvec::smallvec![candidate]
            } else {
                PackMatches::new()
            };
        }

        let Ok(entries) = fs::read_dir(&dir) else {
            return PackMatches::new();
        };
        let mut found: PackMatches = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter(|entry| wildcard_match(&self.file, &entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .collect();
        found.sort();
        found
    }
}

/// Glob-style match supporting `*` (any run) and `?` (any single char).
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if let Some(s) = star {
            // backtrack: let the last star swallow one more char
            pi = s + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
