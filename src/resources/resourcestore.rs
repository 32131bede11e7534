//! Typed store of registered resources.
//!
//! Resources live in an arena indexed by [`ResourceHandle`]; a hash map
//! resolves string ids to handles. The store is the sole owner of every
//! resource; other resources only keep ids and handles.

use crate::error::{ResourceError, ResourceResult};
use crate::resources::descriptor::{
    ResolvedDependencies, ResolvedPaths, ResourceDescriptor, ResourceRef,
};
use crate::resources::resource::{PackResource, ResourceKind, TypedResource};
use rustc_hash::FxHashMap;

/// Index of a resource inside the store. Stable until the store is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(usize);

impl ResourceHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One registered resource and its per-pass state.
pub(crate) struct ResourceEntry {
    pub id: String,
    pub kind: ResourceKind,
    pub descriptor: ResourceDescriptor,
    /// `None` only while the resource is lent out to its own `load`.
    pub resource: Option<Box<dyn PackResource>>,
    pub paths: ResolvedPaths,
    pub dependencies: ResolvedDependencies,
    /// Fingerprint of `paths` as of the last successful load.
    pub fingerprint: Option<u64>,
    pub loaded: bool,
}

impl ResourceEntry {
    pub fn reset_pass_state(&mut self) {
        self.paths = ResolvedPaths::default();
        self.dependencies = ResolvedDependencies::default();
        self.fingerprint = None;
    }
}

#[derive(Default)]
pub struct ResourceStore {
    entries: Vec<ResourceEntry>,
    index: FxHashMap<String, ResourceHandle>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under `id`.
    ///
    /// The descriptor is captured here and never read again. Fails if `id`
    /// is taken; the original registration is kept.
    pub fn try_add<T: TypedResource>(
        &mut self,
        id: impl Into<String>,
        resource: T,
    ) -> ResourceResult<ResourceRef> {
        self.try_add_boxed(id, Box::new(resource))
    }

    pub fn try_add_boxed(
        &mut self,
        id: impl Into<String>,
        resource: Box<dyn PackResource>,
    ) -> ResourceResult<ResourceRef> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(ResourceError::DuplicateResourceId(id));
        }
        let handle = ResourceHandle(self.entries.len());
        let kind = resource.kind();
        let descriptor = resource.descriptor();
        self.index.insert(id.clone(), handle);
        self.entries.push(ResourceEntry {
            id: id.clone(),
            kind,
            descriptor,
            resource: Some(resource),
            paths: ResolvedPaths::default(),
            dependencies: ResolvedDependencies::default(),
            fingerprint: None,
            loaded: false,
        });
        Ok(ResourceRef::new(id, handle, kind))
    }

    pub fn handle(&self, id: &str) -> Option<ResourceHandle> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<ResourceKind> {
        self.handle(id).map(|h| self.entries[h.0].kind)
    }

    /// Typed lookup. `None` if absent or registered with another kind.
    pub fn get<T: TypedResource>(&self, id: &str) -> Option<&T> {
        self.get_by_handle(self.handle(id)?)
    }

    pub fn get_mut<T: TypedResource>(&mut self, id: &str) -> Option<&mut T> {
        let handle = self.handle(id)?;
        let entry = self.entries.get_mut(handle.0)?;
        if entry.kind != T::KIND {
            return None;
        }
        entry.resource.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn get_by_handle<T: TypedResource>(&self, handle: ResourceHandle) -> Option<&T> {
        let entry = self.entries.get(handle.0)?;
        if entry.kind != T::KIND {
            return None;
        }
        entry.resource.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Untyped lookup, for collaborators that only need the capability.
    pub fn get_dyn(&self, id: &str) -> Option<&dyn PackResource> {
        self.entries[self.handle(id)?.0].resource.as_deref()
    }

    /// Whether the resource's last load succeeded and it has not been unloaded since.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.handle(id).is_some_and(|h| self.entries[h.0].loaded)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn handles(&self) -> impl Iterator<Item = ResourceHandle> + use<> {
        (0..self.entries.len()).map(ResourceHandle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every resource. Callers unload first.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub(crate) fn entry(&self, handle: ResourceHandle) -> &ResourceEntry {
        &self.entries[handle.0]
    }

    pub(crate) fn entry_mut(&mut self, handle: ResourceHandle) -> &mut ResourceEntry {
        &mut self.entries[handle.0]
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut ResourceEntry> {
        self.entries.iter_mut()
    }

    pub(crate) fn id_of(&self, handle: ResourceHandle) -> &str {
        &self.entries[handle.0].id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::resource::LoadContext;

    struct Palette;
    struct Sound;

    impl PackResource for Palette {
        fn kind(&self) -> ResourceKind {
            Self::KIND
        }
        fn load(&mut self, _ctx: &LoadContext<'_>) -> ResourceResult<()> {
            Ok(())
        }
        fn unload(&mut self, _id: &str) {}
    }

    impl TypedResource for Palette {
        const KIND: ResourceKind = ResourceKind::new("palette");
    }

    impl PackResource for Sound {
        fn kind(&self) -> ResourceKind {
            Self::KIND
        }
        fn load(&mut self, _ctx: &LoadContext<'_>) -> ResourceResult<()> {
            Ok(())
        }
        fn unload(&mut self, _id: &str) {}
    }

    impl TypedResource for Sound {
        const KIND: ResourceKind = ResourceKind::new("sound");
    }

    #[test]
    fn test_add_and_get_typed() {
        let mut store = ResourceStore::new();
        let r = store.try_add("ui", Palette).unwrap();
        assert_eq!(r.id(), "ui");
        assert_eq!(r.kind(), Palette::KIND);
        assert!(store.get::<Palette>("ui").is_some());
        assert!(store.get_mut::<Palette>("ui").is_some());
        assert_eq!(store.kind_of("ui"), Some(Palette::KIND));
    }

    #[test]
    fn test_get_with_wrong_type_is_none() {
        let mut store = ResourceStore::new();
        store.try_add("ui", Palette).unwrap();
        assert!(store.get::<Sound>("ui").is_none());
        assert!(store.get_mut::<Sound>("ui").is_none());
        assert!(store.get::<Palette>("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_keeps_original() {
        let mut store = ResourceStore::new();
        store.try_add("x", Palette).unwrap();
        let err = store.try_add("x", Sound).unwrap_err();
        assert!(matches!(err, ResourceError::DuplicateResourceId(id) if id == "x"));
        assert_eq!(store.kind_of("x"), Some(Palette::KIND));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_in_registration_order() {
        let mut store = ResourceStore::new();
        store.try_add("b", Palette).unwrap();
        store.try_add("a", Sound).unwrap();
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains("a"));
    }
}
