//! Capability traits implemented by every pack-backed resource type.
//!
//! A resource only sees the world through a [`LoadContext`]: its own id, the
//! files resolved for each of its path ids, and read access to the resources
//! it declared as dependencies. It never owns another resource.

use crate::error::{ResourceError, ResourceResult};
use crate::resources::descriptor::{ResolvedDependencies, ResolvedPaths, ResourceDescriptor};
use crate::resources::resourcestore::ResourceStore;
use std::any::Any;
use std::fmt;
use std::path::Path;

/// Runtime tag naming a resource type.
///
/// Dependency declarations and typed lookups compare tags instead of
/// reflecting on the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKind(&'static str);

impl ResourceKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Upcast helper so stored trait objects can be downcast to their type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A resource whose backing files come from the active packs.
pub trait PackResource: AsAny + Send + Sync + 'static {
    /// Tag of the concrete type.
    fn kind(&self) -> ResourceKind;

    /// Dependencies and path ids this resource needs. Read once, when the
    /// resource is registered.
    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::default()
    }

    /// Build the resource from its resolved files and dependencies.
    fn load(&mut self, ctx: &LoadContext<'_>) -> ResourceResult<()>;

    /// Release everything acquired by [`load`](Self::load).
    fn unload(&mut self, id: &str);
}

/// Resource types that can be retrieved by type.
pub trait TypedResource: PackResource + Sized {
    const KIND: ResourceKind;
}

/// Everything a resource may look at while loading.
pub struct LoadContext<'a> {
    id: &'a str,
    descriptor: &'a ResourceDescriptor,
    paths: &'a ResolvedPaths,
    dependencies: &'a ResolvedDependencies,
    store: &'a ResourceStore,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(
        id: &'a str,
        descriptor: &'a ResourceDescriptor,
        paths: &'a ResolvedPaths,
        dependencies: &'a ResolvedDependencies,
        store: &'a ResourceStore,
    ) -> Self {
        Self {
            id,
            descriptor,
            paths,
            dependencies,
            store,
        }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn paths(&self) -> &'a ResolvedPaths {
        self.paths
    }

    /// A resolved dependency, if it exists and has type `T`.
    pub fn dependency<T: TypedResource>(&self, dep_id: &str) -> Option<&'a T> {
        let reference = self.dependencies.get(dep_id)?;
        self.store.get_by_handle::<T>(reference.handle())
    }

    /// Like [`dependency`](Self::dependency), failing with the matching graph
    /// error when the dependency was not declared.
    pub fn require_dependency<T: TypedResource>(&self, dep_id: &str) -> ResourceResult<&'a T> {
        self.dependency::<T>(dep_id)
            .ok_or_else(|| ResourceError::MissingDependencyResource {
                resource: self.id.to_string(),
                dependency: dep_id.to_string(),
            })
    }

    /// Highest priority file for `file_id`, or a `PathNotFound` error.
    pub fn require_winner(&self, file_id: &str) -> ResourceResult<&'a Path> {
        self.paths
            .winner(file_id)
            .ok_or_else(|| self.path_not_found(file_id))
    }

    /// Error for a path id that matched no file.
    pub fn path_not_found(&self, file_id: &str) -> ResourceError {
        ResourceError::PathNotFound {
            resource: self.id.to_string(),
            file: file_id.to_string(),
            pattern: self.descriptor.pattern(file_id).unwrap_or_default().to_string(),
        }
    }

    /// Wrap a type specific failure.
    pub fn fail(&self, reason: impl fmt::Display) -> ResourceError {
        ResourceError::Load {
            resource: self.id.to_string(),
            reason: reason.to_string(),
        }
    }
}
