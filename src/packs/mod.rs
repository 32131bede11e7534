//! Resource packs: discovery, activation order and overlay path lookups.
//!
//! Overview
//! - `packmanifest` – `metadata.json` descriptor of one pack on disk
//! - `packregistry` – ordered set of active packs, version and duplicate rules
//! - `pathresolver` – relative path to absolute paths across active packs
pub mod packmanifest;
pub mod packregistry;
pub mod pathresolver;

pub use packmanifest::{AvailablePack, MANIFEST_FILE_NAME, PackManifest};
pub use packregistry::{CURRENT_VERSION, DEFAULT_PACK_NAME, LoadedPack, PackRegistry};
pub use pathresolver::PathResolver;
