//! Resources, their dependency graph and the manager driving them.
//!
//! Overview
//! - `resource` – the [`PackResource`] capability traits and [`LoadContext`]
//! - `descriptor` – declared dependencies/paths and what they resolved to
//! - `resourcestore` – arena of registered resources addressed by handle
//! - `dependencygraph` – dependency resolution and load ordering
//! - `changedetector` – path resolution and fingerprints for soft reload
//! - `resourcemanager` – packs plus resources, and load/unload/soft reload
//! - `packconfig` – INI settings for search paths and enabled packs
//! - `lifecyclebridge` – channel from the manager into `bevy_ecs` messages
pub mod changedetector;
pub mod dependencygraph;
pub mod descriptor;
pub mod lifecyclebridge;
pub mod packconfig;
pub mod resource;
pub mod resourcemanager;
pub mod resourcestore;

pub use descriptor::{ResolvedDependencies, ResolvedPaths, ResourceDescriptor, ResourceRef};
pub use packconfig::PackConfig;
pub use resource::{LoadContext, PackResource, ResourceKind, TypedResource};
pub use resourcemanager::{ResourceManager, SoftReloadReport};
pub use resourcestore::{ResourceHandle, ResourceStore};
