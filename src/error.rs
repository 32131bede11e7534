//! Error type shared by the pack registry and the resource manager.
//!
//! Graph and configuration errors (duplicate ids, missing or mistyped
//! dependencies, cycles) abort the whole `load`/`soft_reload` pass. Path
//! errors are raised by resource types themselves, which decide whether a
//! missing file is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type ResourceResult<T> = Result<T, ResourceError>;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("pack '{id}' is a major pack for version {version}, engine expects {expected}")]
    PackVersionIncompatible { id: String, version: i64, expected: i64 },

    #[error("pack '{0}' is already loaded")]
    DuplicatePackId(String),

    #[error("pack '{0}' is not available in any search path")]
    PackNotFound(String),

    #[error("packs could not be added: {}", .0.join(", "))]
    PacksRejected(Vec<String>),

    #[error("invalid manifest {path:?}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("resource '{resource}' declares dependency '{dependency}' more than once")]
    DuplicateDependencyRegistration { resource: String, dependency: String },

    #[error("resource '{resource}' depends on missing resource '{dependency}'")]
    MissingDependencyResource { resource: String, dependency: String },

    #[error(
        "resource '{resource}' expects '{dependency}' to be of kind '{expected}', found '{found}'"
    )]
    DependencyTypeMismatch {
        resource: String,
        dependency: String,
        expected: String,
        found: String,
    },

    #[error("cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("resource '{resource}' declares path id '{file}' more than once")]
    DuplicatePathId { resource: String, file: String },

    #[error("resource '{resource}' found no file for '{file}' ({pattern})")]
    PathNotFound {
        resource: String,
        file: String,
        pattern: String,
    },

    #[error("resource id '{0}' is already registered")]
    DuplicateResourceId(String),

    #[error("resources are not loaded")]
    NotLoaded,

    #[error("resource '{resource}' failed to load: {reason}")]
    Load { resource: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    /// Whether the error describes a broken pack or resource graph rather
    /// than a single resource failing its own load.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            ResourceError::DuplicateDependencyRegistration { .. }
                | ResourceError::MissingDependencyResource { .. }
                | ResourceError::DependencyTypeMismatch { .. }
                | ResourceError::CyclicDependency(_)
                | ResourceError::DuplicatePathId { .. }
        )
    }
}
