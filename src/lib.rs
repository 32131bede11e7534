//! Aberred Packs library.
//!
//! Layered resource packs with a dependency-ordered resource lifecycle.
//! Packs are directories carrying a `metadata.json` manifest; activating
//! several of them overlays their files, later packs winning. Resources
//! declare the files and the other resources they need and are loaded,
//! unloaded and soft reloaded by the [`ResourceManager`].

pub mod assets;
pub mod error;
pub mod events;
pub mod packs;
pub mod resources;
pub mod systems;

pub use error::{ResourceError, ResourceResult};
pub use packs::{AvailablePack, LoadedPack, PackManifest, PackRegistry, PathResolver};
pub use resources::{
    LoadContext, PackConfig, PackResource, ResourceDescriptor, ResourceKind, ResourceManager,
    TypedResource,
};
