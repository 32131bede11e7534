//! Dependency resolution and ordering between registered resources.
//!
//! Each resource names its dependencies by registry id and expected kind.
//! [`resolve_dependencies`] turns those declarations into [`ResourceRef`]s and
//! [`DependencyGraph::build`] orders every resource so dependencies come
//! before their dependents. Any inconsistency aborts the pass.

use crate::error::{ResourceError, ResourceResult};
use crate::resources::descriptor::{ResolvedDependencies, ResourceRef};
use crate::resources::resourcestore::{ResourceHandle, ResourceStore};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Resolve the declared dependencies of one resource against the store.
pub fn resolve_dependencies(
    store: &ResourceStore,
    handle: ResourceHandle,
) -> ResourceResult<ResolvedDependencies> {
    let entry = store.entry(handle);
    let mut resolved = ResolvedDependencies::default();
    for (dep_id, expected) in entry.descriptor.dependency_types() {
        if resolved.contains(dep_id) {
            return Err(ResourceError::DuplicateDependencyRegistration {
                resource: entry.id.clone(),
                dependency: dep_id.clone(),
            });
        }
        let Some(dep_handle) = store.handle(dep_id) else {
            return Err(ResourceError::MissingDependencyResource {
                resource: entry.id.clone(),
                dependency: dep_id.clone(),
            });
        };
        let found = store.entry(dep_handle).kind;
        if found != *expected {
            return Err(ResourceError::DependencyTypeMismatch {
                resource: entry.id.clone(),
                dependency: dep_id.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        resolved.insert(dep_id.clone(), ResourceRef::new(dep_id.clone(), dep_handle, found));
    }
    Ok(resolved)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Topological order of all resources plus reverse edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    order: Vec<ResourceHandle>,
    dependents: Vec<Vec<ResourceHandle>>,
}

impl DependencyGraph {
    /// Order every resource of `store`; `dependencies[i]` belongs to handle `i`.
    ///
    /// Resources are visited in registration order and dependencies in
    /// declaration order, so the result is stable for a given store.
    pub fn build(
        store: &ResourceStore,
        dependencies: &[ResolvedDependencies],
    ) -> ResourceResult<Self> {
        let count = dependencies.len();
        let mut marks = vec![Mark::Unvisited; count];
        let mut order = Vec::with_capacity(count);
        let mut stack = Vec::new();
        for handle in store.handles().take(count) {
            visit(store, dependencies, handle, &mut marks, &mut stack, &mut order)?;
        }

        let mut dependents = vec![Vec::new(); count];
        for (handle, deps) in store.handles().zip(dependencies) {
            for dep in deps.iter() {
                dependents[dep.handle().index()].push(handle);
            }
        }
        Ok(Self { order, dependents })
    }

    /// Dependencies before dependents.
    pub fn order(&self) -> &[ResourceHandle] {
        &self.order
    }

    /// Resources that directly depend on `handle`.
    pub fn dependents(&self, handle: ResourceHandle) -> &[ResourceHandle] {
        self.dependents
            .get(handle.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `seeds` plus everything that transitively depends on them.
    pub fn with_dependents<I>(&self, seeds: I) -> FxHashSet<ResourceHandle>
    where
        I: IntoIterator<Item = ResourceHandle>,
    {
        let mut reached = FxHashSet::default();
        let mut queue: VecDeque<ResourceHandle> = seeds.into_iter().collect();
        while let Some(handle) = queue.pop_front() {
            if reached.insert(handle) {
                queue.extend(self.dependents(handle).iter().copied());
            }
        }
        reached
    }
}

fn visit(
    store: &ResourceStore,
    dependencies: &[ResolvedDependencies],
    handle: ResourceHandle,
    marks: &mut [Mark],
    stack: &mut Vec<ResourceHandle>,
    order: &mut Vec<ResourceHandle>,
) -> ResourceResult<()> {
    match marks[handle.index()] {
        Mark::Done => return Ok(()),
        Mark::InProgress => {
            // The cycle is the part of the stack starting at `handle`.
            let start = stack.iter().position(|h| *h == handle).unwrap_or(0);
            let mut ids: Vec<String> = stack[start..]
                .iter()
                .map(|h| store.id_of(*h).to_string())
                .collect();
            ids.push(store.id_of(handle).to_string());
            return Err(ResourceError::CyclicDependency(ids));
        }
        Mark::Unvisited => {}
    }

    marks[handle.index()] = Mark::InProgress;
    stack.push(handle);
    for dep in dependencies[handle.index()].iter() {
        visit(store, dependencies, dep.handle(), marks, stack, order)?;
    }
    stack.pop();
    marks[handle.index()] = Mark::Done;
    order.push(handle);
    Ok(())
}
