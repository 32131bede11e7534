//! The resource manager: packs, registered resources and their lifecycle.
//!
//! [`ResourceManager`] is an explicitly constructed context object. Host
//! code creates one, registers resources, activates packs and then drives
//! [`load`](ResourceManager::load), [`soft_reload`](ResourceManager::soft_reload)
//! and [`unload`](ResourceManager::unload) from a single thread. It is also a
//! `bevy_ecs` resource so systems can reach it through `Res`/`ResMut`.
//!
//! State machine
//! - `Unloaded --load ok--> Loaded`
//! - `Loaded --unload--> Unloaded`
//! - `Loaded --soft_reload--> Loaded`
//!
//! Every pass resolves paths, then dependencies, then orders resources with
//! [`DependencyGraph`]. A graph error aborts the pass before any resource is
//! touched.

use crate::error::{ResourceError, ResourceResult};
use crate::events::lifecycle::ResourceLifecycle;
use crate::packs::packmanifest::AvailablePack;
use crate::packs::packregistry::{LoadedPack, PackRegistry};
use crate::resources::changedetector::{self, PathRefresh};
use crate::resources::dependencygraph::{self, DependencyGraph};
use crate::resources::descriptor::{ResolvedDependencies, ResolvedPaths, ResourceRef};
use crate::resources::packconfig::PackConfig;
use crate::resources::resource::{LoadContext, PackResource, ResourceKind, TypedResource};
use crate::resources::resourcestore::{ResourceHandle, ResourceStore};
use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use rustc_hash::FxHashSet;
use std::path::PathBuf;

/// Outcome of a soft reload that was not aborted.
#[derive(Debug, Default)]
pub struct SoftReloadReport {
    /// Reloaded resources, in load order.
    pub reloaded: Vec<String>,
    /// Resources left unloaded, with the reason.
    pub failed: Vec<(String, ResourceError)>,
}

impl SoftReloadReport {
    /// Nothing needed reloading.
    pub fn is_empty(&self) -> bool {
        self.reloaded.is_empty() && self.failed.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything resolved for one pass, before any resource is touched.
struct ReloadPlan {
    refresh: Vec<PathRefresh>,
    dependencies: Vec<ResolvedDependencies>,
    graph: DependencyGraph,
}

#[derive(Resource)]
pub struct ResourceManager {
    packs: PackRegistry,
    store: ResourceStore,
    loaded: bool,
    /// Topological order used by the last successful pass.
    load_order: Vec<ResourceHandle>,
    subscribers: Vec<Sender<ResourceLifecycle>>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(PackRegistry::default())
    }
}

impl ResourceManager {
    pub fn new(packs: PackRegistry) -> Self {
        Self {
            packs,
            store: ResourceStore::new(),
            loaded: false,
            load_order: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Build a manager from the `[engine]` and `[packs]` settings. Packs are
    /// not activated; see [`add_configured_packs`](Self::add_configured_packs).
    pub fn from_config(config: &PackConfig) -> Self {
        Self::new(
            PackRegistry::new(config.search_paths.iter().cloned())
                .with_current_version(config.current_version)
                .with_default_pack_name(config.default_pack.clone()),
        )
    }

    // ===== Packs =====

    pub fn packs(&self) -> &PackRegistry {
        &self.packs
    }

    pub fn current_version(&self) -> i64 {
        self.packs.current_version()
    }

    pub fn default_pack_name(&self) -> &str {
        self.packs.default_pack_name()
    }

    /// Active packs, lowest priority first.
    pub fn loaded_packs(&self) -> &[LoadedPack] {
        self.packs.loaded_packs()
    }

    pub fn available_packs(&self) -> impl Iterator<Item = AvailablePack> + '_ {
        self.packs.available_packs()
    }

    pub fn unloaded_available_packs(&self) -> impl Iterator<Item = AvailablePack> + '_ {
        self.packs.unloaded_available_packs()
    }

    /// Activate a pack. Resources pick it up on the next `load`/`soft_reload`.
    pub fn try_add_pack(&mut self, pack: AvailablePack) -> ResourceResult<()> {
        self.packs.try_add_pack(pack)
    }

    pub fn try_add_packs_by_names<I, S>(&mut self, names: I) -> ResourceResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.packs.try_add_packs_by_names(names)
    }

    /// Activate the default pack (unless listed) followed by the configured list.
    pub fn add_configured_packs(&mut self, config: &PackConfig) -> ResourceResult<()> {
        let default = self.packs.default_pack_name().to_string();
        let mut names = Vec::with_capacity(config.enabled.len() + 1);
        if !config.enabled.iter().any(|name| *name == default) && !self.packs.is_loaded(&default) {
            names.push(default);
        }
        names.extend(config.enabled.iter().cloned());
        self.packs.try_add_packs_by_names(names)
    }

    /// Deactivate a pack. Resolved paths go stale until the next pass.
    pub fn try_remove_pack(&mut self, id: &str) -> Option<LoadedPack> {
        self.packs.try_remove_pack(id)
    }

    /// Unload everything, then drop every pack and every registered resource.
    pub fn remove_all_packs(&mut self) {
        self.unload();
        self.packs.remove_all_packs();
        self.store.clear();
        self.load_order.clear();
    }

    /// Every match for `relative`, highest priority pack first.
    pub fn get_all_paths<'s>(&'s self, relative: &str) -> impl Iterator<Item = PathBuf> + use<'s> {
        self.packs.resolver().get_all_paths(relative)
    }

    /// Winning match for `relative`.
    pub fn try_get_path(&self, relative: &str) -> Option<PathBuf> {
        self.packs.resolver().try_get_path(relative)
    }

    // ===== Resources =====

    /// Register a resource. It is loaded by the next `load` or `soft_reload`.
    pub fn try_add_resource<T: TypedResource>(
        &mut self,
        id: impl Into<String>,
        resource: T,
    ) -> ResourceResult<ResourceRef> {
        self.try_add_boxed_resource(id, Box::new(resource))
    }

    pub fn try_add_boxed_resource(
        &mut self,
        id: impl Into<String>,
        resource: Box<dyn PackResource>,
    ) -> ResourceResult<ResourceRef> {
        let id = id.into();
        match self.store.try_add_boxed(id.clone(), resource) {
            Ok(reference) => {
                debug!(target: "resources", "Registered resource '{}' ({})", id, reference.kind());
                Ok(reference)
            }
            Err(e) => {
                warn!(target: "resources", "Could not register resource '{}': {}", id, e);
                Err(e)
            }
        }
    }

    /// Typed lookup; `None` if absent or of another type.
    pub fn try_get_resource<T: TypedResource>(&self, id: &str) -> Option<&T> {
        self.store.get::<T>(id)
    }

    pub fn try_get_resource_mut<T: TypedResource>(&mut self, id: &str) -> Option<&mut T> {
        self.store.get_mut::<T>(id)
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.store
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.store.ids()
    }

    pub fn resource_kind(&self, id: &str) -> Option<ResourceKind> {
        self.store.kind_of(id)
    }

    /// Paths resolved for `id` by the last pass.
    pub fn resolved_paths(&self, id: &str) -> Option<&ResolvedPaths> {
        self.store.handle(id).map(|h| &self.store.entry(h).paths)
    }

    /// Dependencies resolved for `id` by the last pass.
    pub fn resolved_dependencies(&self, id: &str) -> Option<&ResolvedDependencies> {
        self.store.handle(id).map(|h| &self.store.entry(h).dependencies)
    }

    /// Fingerprint recorded when `id` last loaded successfully.
    pub fn paths_hash(&self, id: &str) -> Option<u64> {
        self.store.handle(id).and_then(|h| self.store.entry(h).fingerprint)
    }

    // ===== Lifecycle =====

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Receive a [`ResourceLifecycle`] message after every pass.
    pub fn subscribe(&mut self) -> Receiver<ResourceLifecycle> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Resolve and load every registered resource, dependencies first.
    ///
    /// Already loaded managers are unloaded first. On any failure the
    /// resources loaded so far in this pass are unloaded again, in reverse
    /// order, and the manager stays unloaded.
    pub fn load(&mut self) -> ResourceResult<()> {
        if self.loaded {
            info!(target: "resources", "Reloading all resources");
            self.unload();
        }
        info!(
            target: "resources",
            "Loading {} resources from {} packs",
            self.store.len(),
            self.packs.loaded_packs().len()
        );

        let result = self.plan().and_then(|plan| {
            let order = plan.graph.order().to_vec();
            self.apply_plan(plan);
            let mut guard = LoadGuard::new(&mut self.store);
            for handle in &order {
                guard.load(*handle)?;
            }
            guard.commit();
            Ok(order)
        });

        match result {
            Ok(order) => {
                self.load_order = order;
                self.loaded = true;
                info!(target: "resources", "Loaded {} resources", self.load_order.len());
                self.emit(ResourceLifecycle::Loaded {
                    resources: self.load_order.len(),
                });
                Ok(())
            }
            Err(e) => {
                error!(target: "resources", "Load aborted: {}", e);
                self.clear_pass_state();
                self.emit(ResourceLifecycle::LoadFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Unload every resource, dependents before their dependencies, and
    /// forget pack derived state. Does nothing when not loaded.
    pub fn unload(&mut self) {
        if !self.loaded {
            debug!(target: "resources", "Unload skipped, nothing loaded");
            return;
        }
        for handle in self.load_order.iter().rev() {
            unload_entry(&mut self.store, *handle);
        }
        self.clear_pass_state();
        self.loaded = false;
        info!(target: "resources", "Unloaded all resources");
        self.emit(ResourceLifecycle::Unloaded);
    }

    /// Reload only what the current packs changed.
    ///
    /// A resource is reloaded when its path fingerprint moved, when its
    /// resolved dependencies differ from the last pass, or when it was
    /// registered or failed since; all its transitive dependents are reloaded
    /// with it. Graph errors abort before anything is touched. A resource that
    /// fails to reload is reported and left unloaded, along with its
    /// dependents; other resources are not reverted. Resource identities are
    /// kept: each resource is reloaded in place.
    pub fn soft_reload(&mut self) -> ResourceResult<SoftReloadReport> {
        if !self.loaded {
            return Err(ResourceError::NotLoaded);
        }
        let plan = match self.plan() {
            Ok(plan) => plan,
            Err(e) => {
                error!(target: "resources", "Soft reload aborted: {}", e);
                return Err(e);
            }
        };

        let dirty: Vec<ResourceHandle> = plan
            .refresh
            .iter()
            .zip(&plan.dependencies)
            .filter(|(refresh, deps)| {
                let entry = self.store.entry(refresh.handle);
                refresh.changed || !entry.loaded || entry.dependencies != **deps
            })
            .map(|(refresh, _)| refresh.handle)
            .collect();
        let affected = plan.graph.with_dependents(dirty);
        let order = plan.graph.order().to_vec();
        if affected.is_empty() {
            debug!(target: "resources", "Soft reload found no changes");
            self.load_order = order;
            return Ok(SoftReloadReport::default());
        }
        info!(target: "resources", "Soft reload affects {} resources", affected.len());

        for handle in order.iter().rev().filter(|h| affected.contains(*h)) {
            unload_entry(&mut self.store, *handle);
        }
        self.apply_plan(plan);

        let mut report = SoftReloadReport::default();
        let mut failed: FxHashSet<ResourceHandle> = FxHashSet::default();
        for handle in order.iter().copied().filter(|h| affected.contains(h)) {
            let entry = self.store.entry(handle);
            let broken_dep = entry
                .dependencies
                .iter()
                .find(|dep| failed.contains(&dep.handle()))
                .map(|dep| dep.id().to_string());
            let result = match broken_dep {
                Some(dep) => Err(ResourceError::Load {
                    resource: entry.id.clone(),
                    reason: format!("dependency '{}' failed to reload", dep),
                }),
                None => load_entry(&mut self.store, handle),
            };

            let entry = self.store.entry_mut(handle);
            match result {
                Ok(()) => report.reloaded.push(entry.id.clone()),
                Err(e) => {
                    warn!(target: "resources", "Could not reload '{}': {}", entry.id, e);
                    // cleared so the next pass retries it
                    entry.fingerprint = None;
                    failed.insert(handle);
                    report.failed.push((entry.id.clone(), e));
                }
            }
        }
        self.load_order = order;

        info!(
            target: "resources",
            "Soft reload done: {} reloaded, {} failed",
            report.reloaded.len(),
            report.failed.len()
        );
        if !report.reloaded.is_empty() {
            self.emit(ResourceLifecycle::Reloaded {
                ids: report.reloaded.clone(),
            });
        }
        let failures: Vec<ResourceLifecycle> = report
            .failed
            .iter()
            .map(|(id, e)| ResourceLifecycle::ReloadFailed {
                id: id.clone(),
                reason: e.to_string(),
            })
            .collect();
        for message in failures {
            self.emit(message);
        }
        Ok(report)
    }

    /// Resolve paths, dependencies and order without touching resources.
    fn plan(&self) -> ResourceResult<ReloadPlan> {
        let refresh = changedetector::refresh_paths(&self.store, self.packs.resolver())?;
        let dependencies = self
            .store
            .handles()
            .map(|handle| dependencygraph::resolve_dependencies(&self.store, handle))
            .collect::<ResourceResult<Vec<_>>>()?;
        let graph = DependencyGraph::build(&self.store, &dependencies)?;
        Ok(ReloadPlan {
            refresh,
            dependencies,
            graph,
        })
    }

    /// Store resolved paths and dependencies. Fingerprints are recorded for
    /// the whole pass here; soft reload clears the ones that fail.
    fn apply_plan(&mut self, plan: ReloadPlan) {
        for (refresh, deps) in plan.refresh.into_iter().zip(plan.dependencies) {
            let entry = self.store.entry_mut(refresh.handle);
            entry.paths = refresh.paths;
            entry.dependencies = deps;
            entry.fingerprint = Some(refresh.fingerprint);
        }
    }

    fn clear_pass_state(&mut self) {
        for entry in self.store.entries_mut() {
            entry.reset_pass_state();
        }
        self.load_order.clear();
    }

    fn emit(&mut self, message: ResourceLifecycle) {
        self.subscribers.retain(|tx| tx.send(message.clone()).is_ok());
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Unloads, in reverse order, everything it loaded unless committed.
struct LoadGuard<'a> {
    store: &'a mut ResourceStore,
    loaded: Vec<ResourceHandle>,
    committed: bool,
}

impl<'a> LoadGuard<'a> {
    fn new(store: &'a mut ResourceStore) -> Self {
        Self {
            store,
            loaded: Vec::new(),
            committed: false,
        }
    }

    fn load(&mut self, handle: ResourceHandle) -> ResourceResult<()> {
        load_entry(self.store, handle)?;
        self.loaded.push(handle);
        Ok(())
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for handle in self.loaded.iter().rev() {
            unload_entry(self.store, *handle);
        }
    }
}

/// Run one resource's `load` with read access to the rest of the store.
fn load_entry(store: &mut ResourceStore, handle: ResourceHandle) -> ResourceResult<()> {
    let taken = store.entry_mut(handle).resource.take();
    let Some(mut resource) = taken else {
        return Err(ResourceError::Load {
            resource: store.id_of(handle).to_string(),
            reason: "resource is already being loaded".to_string(),
        });
    };
    let result = {
        let entry = store.entry(handle);
        debug!(target: "resources", "Loading '{}' ({})", entry.id, entry.kind);
        let ctx = LoadContext::new(
            &entry.id,
            &entry.descriptor,
            &entry.paths,
            &entry.dependencies,
            store,
        );
        resource.load(&ctx)
    };
    let entry = store.entry_mut(handle);
    entry.resource = Some(resource);
    entry.loaded = result.is_ok();
    result
}

fn unload_entry(store: &mut ResourceStore, handle: ResourceHandle) {
    let entry = store.entry_mut(handle);
    if !entry.loaded {
        return;
    }
    debug!(target: "resources", "Unloading '{}'", entry.id);
    if let Some(resource) = entry.resource.as_deref_mut() {
        resource.unload(&entry.id);
    }
    entry.loaded = false;
}
